//! Background simulation worker.
//!
//! Runs one simulation on its own thread and reports progress and the final
//! result over a channel. Nothing is shared with the caller during the run.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use cf_cell::{OcvCurve, PolicyId};

use crate::error::{AppError, AppResult};
use crate::params::ParameterMap;
use crate::run_service::{self, SimulationResult};

pub struct SimulationWorker {
    pub progress_rx: Receiver<WorkerMessage>,
    handle: JoinHandle<()>,
}

#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Progress {
        step: usize,
        step_cap: usize,
        sim_time: f64,
        soc: f64,
    },
    Complete(Box<SimulationResult>),
    Error {
        message: String,
    },
}

impl SimulationWorker {
    pub fn start(policy: PolicyId, parameters: ParameterMap, ocv: Option<OcvCurve>) -> Self {
        let (tx, rx) = channel();

        let handle = thread::spawn(move || {
            if let Err(e) = Self::run(policy, &parameters, ocv, &tx) {
                let _ = tx.send(WorkerMessage::Error {
                    message: e.to_string(),
                });
            }
        });

        Self {
            progress_rx: rx,
            handle,
        }
    }

    fn run(
        policy: PolicyId,
        parameters: &ParameterMap,
        ocv: Option<OcvCurve>,
        tx: &Sender<WorkerMessage>,
    ) -> AppResult<()> {
        let result = run_service::run_simulation_with_progress(policy, parameters, ocv, |p| {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(WorkerMessage::Progress {
                step: p.step,
                step_cap: p.step_cap,
                sim_time: p.sim_time,
                soc: p.soc,
            });
        })?;

        tx.send(WorkerMessage::Complete(Box::new(result)))
            .map_err(|e| AppError::Worker(e.to_string()))
    }

    /// Block until the run finishes, discarding progress messages.
    pub fn wait(self) -> AppResult<SimulationResult> {
        let mut outcome = None;
        for msg in self.progress_rx.iter() {
            match msg {
                WorkerMessage::Progress { .. } => {}
                WorkerMessage::Complete(result) => {
                    outcome = Some(Ok(*result));
                    break;
                }
                WorkerMessage::Error { message } => {
                    outcome = Some(Err(AppError::Worker(message)));
                    break;
                }
            }
        }
        self.handle
            .join()
            .map_err(|_| AppError::Worker("simulation thread panicked".to_string()))?;
        outcome.unwrap_or_else(|| {
            Err(AppError::Worker(
                "worker exited without a result".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use cf_sim::SimStatus;

    #[test]
    fn worker_delivers_result() {
        let mut params = ParameterMap::new();
        params.insert("Iset".into(), ParamValue::Number(30.0));
        params.insert("soc_threshold".into(), ParamValue::Number(0.2));
        let worker = SimulationWorker::start(PolicyId::Cc, params, None);
        let result = worker.wait().unwrap();
        assert_eq!(result.status, SimStatus::Completed);
    }

    #[test]
    fn worker_reports_progress_then_completion() {
        let mut params = ParameterMap::new();
        params.insert("max_steps".into(), ParamValue::Number(50.0));
        let worker = SimulationWorker::start(PolicyId::Sine, params, None);
        let messages: Vec<_> = worker.progress_rx.iter().collect();
        assert!(matches!(messages.first(), Some(WorkerMessage::Progress { step: 0, .. })));
        assert!(matches!(messages.last(), Some(WorkerMessage::Complete(_))));
    }

    #[test]
    fn worker_forwards_parameter_errors() {
        let mut params = ParameterMap::new();
        params.insert("dt".into(), ParamValue::Number(-1.0));
        let worker = SimulationWorker::start(PolicyId::Cv, params, None);
        let err = worker.wait().unwrap_err();
        assert!(err.to_string().contains("dt"));
    }
}
