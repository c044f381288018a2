//! The recording orchestrator: resolves an event to its nearest instance,
//! mints credentials, reserves a port, launches a pipeline, and detaches a
//! supervisor that frees the port when the pipeline ends.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

use crate::credentials::CredentialMinter;
use crate::domain::{EventId, RecordingRequest, RecordingResponse};
use crate::clock::Clock;
use crate::error::{RecorderError, RecorderResult};
use crate::pipeline::{
    content_type_for_format, ContainerMuxOptions, ObjectStoreSinkOptions, PipelineFactory,
    PipelinePlan, SrtListenerOptions,
};
use crate::port_pool::PortPool;
use crate::protocol_constants::{DEFAULT_FORMAT, SUPPORTED_FORMATS};
use crate::runtime::TaskSpawner;
use crate::schedule::ScheduleClient;
use crate::timezone::to_utc;
use crate::utils::isostringify;

/// Orchestrates on-demand recording of a broadcast event's nearest instance.
pub struct Recorder {
    clock: Arc<dyn Clock>,
    schedule: Arc<dyn ScheduleClient>,
    credentials: Arc<dyn CredentialMinter>,
    ports: Arc<PortPool>,
    pipelines: Arc<dyn PipelineFactory>,
    spawner: Arc<dyn TaskSpawner>,
    host: String,
    window: Duration,
}

/// A port reservation that releases itself on drop unless [`defuse`](Self::defuse)
/// transfers ownership to the detached supervisor.
///
/// Guards the suspension points between `ports.reserve()` and
/// `detach_supervisor` (schedule/pipeline-launch awaits, and the request
/// future being dropped outright on cancellation) so a port is never leaked.
struct ReservedPort {
    ports: Arc<PortPool>,
    port: u16,
    armed: bool,
}

impl ReservedPort {
    fn reserve(ports: Arc<PortPool>) -> RecorderResult<Self> {
        let port = ports.reserve()?;
        Ok(Self {
            ports,
            port,
            armed: true,
        })
    }

    fn port(&self) -> u16 {
        self.port
    }

    /// Disarms the guard and hands the bare port to its new owner.
    fn defuse(mut self) -> u16 {
        self.armed = false;
        self.port
    }
}

impl Drop for ReservedPort {
    fn drop(&mut self) {
        if self.armed {
            self.ports.release(self.port);
        }
    }
}

impl Recorder {
    /// Wires the recorder's collaborators together.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clock: Arc<dyn Clock>,
        schedule: Arc<dyn ScheduleClient>,
        credentials: Arc<dyn CredentialMinter>,
        ports: Arc<PortPool>,
        pipelines: Arc<dyn PipelineFactory>,
        spawner: Arc<dyn TaskSpawner>,
        host: String,
        window: Duration,
    ) -> Self {
        Self {
            clock,
            schedule,
            credentials,
            ports,
            pipelines,
            spawner,
            host,
            window,
        }
    }

    /// Records the nearest scheduled instance of `request.event`.
    pub async fn record(&self, request: RecordingRequest) -> RecorderResult<RecordingResponse> {
        let reference = self.clock.now_utc_naive();
        let window = ChronoDuration::from_std(self.window).unwrap_or_else(|_| ChronoDuration::zero());
        let reference_utc = reference.and_utc();
        let window_start = reference_utc - window;
        let window_end = reference_utc + window;

        let schedules = self
            .schedule
            .list(window_start, window_end, request.event)
            .await?;
        let schedule = schedules
            .into_iter()
            .find(|s| s.event.id == request.event)
            .ok_or_else(|| RecorderError::InstanceNotFound(request.event.to_string()))?;

        let nearest = nearest_instance(&schedule.event.timezone, &schedule.instances, reference_utc)
            .ok_or_else(|| RecorderError::InstanceNotFound(request.event.to_string()))?;

        let credentials = self.credentials.mint();

        let format = request.format.unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        if !SUPPORTED_FORMATS.contains(&format.as_str()) {
            return Err(RecorderError::UnsupportedFormat(format));
        }

        let reserved = ReservedPort::reserve(Arc::clone(&self.ports))?;
        let port = reserved.port();

        let plan = self.build_plan(&schedule.event.id, nearest.start, &credentials, port, &format);

        let handle = match self.pipelines.create(plan).await {
            Ok(handle) => handle,
            Err(e) => {
                // `reserved` drops here, releasing the port.
                return Err(RecorderError::PipelineLaunchFailed(e.to_string()));
            }
        };

        let port = reserved.defuse();
        self.detach_supervisor(handle, port);

        Ok(RecordingResponse { credentials, port })
    }

    fn build_plan(
        &self,
        event: &EventId,
        start: chrono::NaiveDateTime,
        credentials: &crate::domain::Credentials,
        port: u16,
        format: &str,
    ) -> PipelinePlan {
        let now = self.clock.now_utc();
        let remaining = credentials.expires_at - now;
        let listen_timeout_us = remaining
            .num_microseconds()
            .unwrap_or(0)
            .max(0) as u64;

        let srt = SrtListenerOptions::new(
            self.host.clone(),
            port,
            listen_timeout_us,
            credentials.token.clone(),
        );
        let mux = ContainerMuxOptions::new(format.to_string());
        let key = format!("{event}/{}.{format}", isostringify(start));
        let sink = ObjectStoreSinkOptions {
            key,
            content_type: content_type_for_format(format),
        };

        PipelinePlan { srt, mux, sink }
    }

    fn detach_supervisor(&self, handle: crate::pipeline::PipelineHandle, port: u16) {
        let ports = Arc::clone(&self.ports);
        self.spawner.spawn(async move {
            match handle.wait().await {
                Ok(()) => log::info!("[Recorder] pipeline on port {port} completed"),
                Err(e) => log::warn!("[Recorder] pipeline on port {port} ended with error: {e}"),
            }
            ports.release(port);
        });
    }
}

/// Picks the instance whose `to_utc(start, timezone)` is closest to
/// `reference`. Ties are broken arbitrarily but stably within the call.
fn nearest_instance(
    timezone: &str,
    instances: &[crate::domain::EventInstance],
    reference: chrono::DateTime<chrono::Utc>,
) -> Option<crate::domain::EventInstance> {
    instances
        .iter()
        .filter_map(|instance| {
            to_utc(instance.start, timezone)
                .map(|utc| (utc, *instance))
                .map_err(|e| log::error!("[Recorder] instance has an unresolvable local time: {e}"))
                .ok()
        })
        .min_by_key(|(utc, _)| (*utc - reference).num_microseconds().unwrap_or(i64::MAX).abs())
        .map(|(_, instance)| instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::credentials::RandomCredentialMinter;
    use crate::domain::{Event, EventInstance, EventVariety, Schedule};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct FakeSchedule {
        schedule: Schedule,
    }

    #[async_trait]
    impl ScheduleClient for FakeSchedule {
        async fn list(
            &self,
            _start: chrono::DateTime<Utc>,
            _end: chrono::DateTime<Utc>,
            _event: EventId,
        ) -> RecorderResult<Vec<Schedule>> {
            Ok(vec![self.schedule.clone()])
        }

        async fn get(&self, _event: EventId) -> RecorderResult<Event> {
            Ok(self.schedule.event.clone())
        }
    }

    struct FakePipelineFactory {
        launched: Mutex<Vec<PipelinePlan>>,
    }

    #[async_trait]
    impl PipelineFactory for FakePipelineFactory {
        async fn create(&self, plan: PipelinePlan) -> RecorderResult<crate::pipeline::PipelineHandle> {
            self.launched.lock().unwrap().push(plan);
            let join = tokio::spawn(async { RecorderResult::Ok(()) });
            Ok(crate::pipeline::PipelineHandle::from_join(join))
        }
    }

    struct FailingPipelineFactory;

    #[async_trait]
    impl PipelineFactory for FailingPipelineFactory {
        async fn create(&self, _plan: PipelinePlan) -> RecorderResult<crate::pipeline::PipelineHandle> {
            Err(RecorderError::PipelineLaunchFailed("boom".to_string()))
        }
    }

    /// Never resolves, so a caller can abort the `record()` future while it's
    /// suspended inside `pipelines.create(..).await`, after the port is
    /// reserved but before `detach_supervisor` runs.
    struct StuckPipelineFactory;

    #[async_trait]
    impl PipelineFactory for StuckPipelineFactory {
        async fn create(&self, _plan: PipelinePlan) -> RecorderResult<crate::pipeline::PipelineHandle> {
            std::future::pending::<RecorderResult<crate::pipeline::PipelineHandle>>().await
        }
    }

    struct ImmediateSpawner;

    impl TaskSpawner for ImmediateSpawner {
        fn spawn<F>(&self, future: F)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            tokio::spawn(future);
        }
    }

    fn event(id: Uuid) -> Event {
        Event {
            id,
            variety: EventVariety::Live,
            timezone: "UTC".to_string(),
        }
    }

    #[tokio::test]
    async fn happy_path_reserves_a_port_and_mints_credentials() {
        let event_id = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 11, 55, 0).unwrap();

        let clock = FixedClock::arc(now);
        let schedule = FakeSchedule {
            schedule: Schedule {
                event: event(event_id),
                instances: vec![EventInstance { start }],
            },
        };
        let credentials = RandomCredentialMinter::new(Arc::clone(&clock), Duration::from_secs(60));
        let ports = Arc::new(PortPool::new(HashSet::from([31000])));
        let pipelines = Arc::new(FakePipelineFactory {
            launched: Mutex::new(Vec::new()),
        });

        let recorder = Recorder::new(
            clock,
            Arc::new(schedule),
            Arc::new(credentials),
            Arc::clone(&ports),
            pipelines,
            Arc::new(ImmediateSpawner),
            "0.0.0.0".to_string(),
            Duration::from_secs(3600),
        );

        let response = recorder
            .record(RecordingRequest {
                event: event_id,
                format: None,
            })
            .await
            .unwrap();

        assert_eq!(response.port, 31000);
        assert_eq!(response.credentials.token.len(), 32);
        assert_eq!((response.credentials.expires_at - now).num_seconds(), 60);
    }

    #[tokio::test]
    async fn no_matching_instance_fails_with_instance_not_found() {
        let event_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 11, 55, 0).unwrap();
        let clock = FixedClock::arc(now);
        let schedule = FakeSchedule {
            schedule: Schedule {
                event: event(event_id),
                instances: vec![],
            },
        };
        let credentials = RandomCredentialMinter::new(Arc::clone(&clock), Duration::from_secs(60));
        let ports = Arc::new(PortPool::new(HashSet::from([31000])));
        let pipelines = Arc::new(FakePipelineFactory {
            launched: Mutex::new(Vec::new()),
        });

        let recorder = Recorder::new(
            clock,
            Arc::new(schedule),
            Arc::new(credentials),
            ports,
            pipelines,
            Arc::new(ImmediateSpawner),
            "0.0.0.0".to_string(),
            Duration::from_secs(3600),
        );

        let err = recorder
            .record(RecordingRequest {
                event: event_id,
                format: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::InstanceNotFound(_)));
    }

    #[tokio::test]
    async fn exhausted_pool_fails_with_recorder_busy() {
        let event_id = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 11, 55, 0).unwrap();
        let clock = FixedClock::arc(now);
        let schedule = FakeSchedule {
            schedule: Schedule {
                event: event(event_id),
                instances: vec![EventInstance { start }],
            },
        };
        let credentials = RandomCredentialMinter::new(Arc::clone(&clock), Duration::from_secs(60));
        let ports = Arc::new(PortPool::new(HashSet::new()));
        let pipelines = Arc::new(FakePipelineFactory {
            launched: Mutex::new(Vec::new()),
        });

        let recorder = Recorder::new(
            clock,
            Arc::new(schedule),
            Arc::new(credentials),
            ports,
            pipelines,
            Arc::new(ImmediateSpawner),
            "0.0.0.0".to_string(),
            Duration::from_secs(3600),
        );

        let err = recorder
            .record(RecordingRequest {
                event: event_id,
                format: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::RecorderBusy));
    }

    #[tokio::test]
    async fn launch_failure_releases_the_port() {
        let event_id = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 11, 55, 0).unwrap();
        let clock = FixedClock::arc(now);
        let schedule = FakeSchedule {
            schedule: Schedule {
                event: event(event_id),
                instances: vec![EventInstance { start }],
            },
        };
        let credentials = RandomCredentialMinter::new(Arc::clone(&clock), Duration::from_secs(60));
        let ports = Arc::new(PortPool::new(HashSet::from([31000])));

        let recorder = Recorder::new(
            clock,
            Arc::new(schedule),
            Arc::new(credentials),
            Arc::clone(&ports),
            Arc::new(FailingPipelineFactory),
            Arc::new(ImmediateSpawner),
            "0.0.0.0".to_string(),
            Duration::from_secs(3600),
        );

        let err = recorder
            .record(RecordingRequest {
                event: event_id,
                format: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::PipelineLaunchFailed(_)));
        assert_eq!(ports.in_use_count(), 0);
    }

    #[tokio::test]
    async fn dropping_the_record_future_before_detach_releases_the_port() {
        let event_id = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 11, 55, 0).unwrap();
        let clock = FixedClock::arc(now);
        let schedule = FakeSchedule {
            schedule: Schedule {
                event: event(event_id),
                instances: vec![EventInstance { start }],
            },
        };
        let credentials = RandomCredentialMinter::new(Arc::clone(&clock), Duration::from_secs(60));
        let ports = Arc::new(PortPool::new(HashSet::from([31000])));

        let recorder = Arc::new(Recorder::new(
            clock,
            Arc::new(schedule),
            Arc::new(credentials),
            Arc::clone(&ports),
            Arc::new(StuckPipelineFactory),
            Arc::new(ImmediateSpawner),
            "0.0.0.0".to_string(),
            Duration::from_secs(3600),
        ));

        let in_flight = Arc::clone(&recorder);
        let task = tokio::spawn(async move {
            let _ = in_flight
                .record(RecordingRequest {
                    event: event_id,
                    format: None,
                })
                .await;
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(ports.in_use_count(), 1, "port should be reserved while launch is stuck");

        task.abort();
        let _ = task.await;

        assert_eq!(ports.in_use_count(), 0, "aborting the request must not leak the port");
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected_before_reserving_a_port() {
        let event_id = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 11, 55, 0).unwrap();
        let clock = FixedClock::arc(now);
        let schedule = FakeSchedule {
            schedule: Schedule {
                event: event(event_id),
                instances: vec![EventInstance { start }],
            },
        };
        let credentials = RandomCredentialMinter::new(Arc::clone(&clock), Duration::from_secs(60));
        let ports = Arc::new(PortPool::new(HashSet::from([31000])));
        let pipelines = Arc::new(FakePipelineFactory {
            launched: Mutex::new(Vec::new()),
        });

        let recorder = Recorder::new(
            clock,
            Arc::new(schedule),
            Arc::new(credentials),
            Arc::clone(&ports),
            pipelines,
            Arc::new(ImmediateSpawner),
            "0.0.0.0".to_string(),
            Duration::from_secs(3600),
        );

        let err = recorder
            .record(RecordingRequest {
                event: event_id,
                format: Some("flac".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::UnsupportedFormat(_)));
        assert_eq!(ports.in_use_count(), 0);
    }
}
