use super::LinuxInterface;
use super::iw;
use crate::config;
use crate::error::{WifiError, WifiResult};
use crate::wifi::platform::EventSink;
use crate::wifi::types::{EventCategory, WifiEvent, WifiEventKind};
use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

type LinkQuality = (i32, f64);

/// Where the poller reads link quality from
struct QualitySource {
    interface: String,
    read: Box<dyn Fn() -> Option<LinkQuality> + Send>,
}

/// Follows `iw event` and polls link quality on behalf of one subscription.
///
/// Dropping the listener kills the event stream and joins both threads, so no
/// copy of the sink outlives it.
#[derive(Debug)]
pub struct IwEventListener {
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
    stop_tx: Option<Sender<()>>,
}

impl IwEventListener {
    /// Start every source the categories need. Sources that fail to start are
    /// reported in the returned result; the others keep running.
    pub fn start(
        categories: &[EventCategory],
        sink: EventSink,
        interface: Option<Arc<LinuxInterface>>,
    ) -> (Self, WifiResult<()>) {
        let quality = interface.map(|interface| QualitySource {
            interface: interface.name.clone(),
            read: Box::new(move || interface.link_quality()),
        });
        Self::launch(
            "iw",
            categories,
            sink,
            quality,
            Duration::from_millis(config::LINK_QUALITY_POLL_MS),
        )
    }

    fn launch(
        program: &str,
        categories: &[EventCategory],
        sink: EventSink,
        quality: Option<QualitySource>,
        interval: Duration,
    ) -> (Self, WifiResult<()>) {
        let wanted: HashSet<EventCategory> = categories.iter().copied().collect();
        let mut result = Ok(());

        let (child, reader) = match spawn_event_stream(program) {
            Ok(mut child) => {
                let reader = child
                    .stdout
                    .take()
                    .map(|stdout| spawn_event_reader(stdout, wanted.clone(), sink.clone()));
                (Some(child), reader)
            }
            Err(err) => {
                result = Err(err);
                (None, None)
            }
        };

        let (stop_tx, stop_rx) = mpsc::channel();
        let mut poller = None;
        if wanted.contains(&EventCategory::LinkQualityChanged) {
            match quality {
                Some(source) => {
                    poller = Some(spawn_quality_poller(source, sink, stop_rx, interval));
                }
                None => {
                    result = result.and(Err(WifiError::failed(
                        "monitor link quality",
                        "no wireless interface",
                    )))
                }
            }
        }

        (
            Self {
                child,
                reader,
                poller,
                stop_tx: Some(stop_tx),
            },
            result,
        )
    }
}

impl Drop for IwEventListener {
    fn drop(&mut self) {
        // Closing the channel wakes the poller out of its wait
        self.stop_tx.take();
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!(error = %e, "failed to stop iw event");
            }
            let _ = child.wait();
        }
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        if let Some(poller) = self.poller.take() {
            let _ = poller.join();
        }
    }
}

fn spawn_event_stream(program: &str) -> WifiResult<Child> {
    Command::new(program)
        .arg("event")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| WifiError::failed("start monitoring", format!("could not run iw event: {e}")))
}

fn spawn_event_reader(
    stdout: ChildStdout,
    wanted: HashSet<EventCategory>,
    sink: EventSink,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines() {
            let Ok(line) = line else { break };
            let Some((name, kind)) = iw::parse_event_line(&line) else {
                continue;
            };
            if !wanted.contains(&kind.category()) {
                continue;
            }
            sink(match name {
                Some(name) => WifiEvent::new(name, kind),
                None => WifiEvent::client(kind),
            });
        }
        debug!("iw event stream closed");
    })
}

/// The event for a new reading, if it differs from the last one. Nothing is
/// reported while the link is down.
fn quality_change(
    last: Option<LinkQuality>,
    current: Option<LinkQuality>,
) -> Option<WifiEventKind> {
    let (rssi_dbm, transmit_rate_mbps) = current?;
    (current != last).then_some(WifiEventKind::LinkQualityChanged {
        rssi_dbm,
        transmit_rate_mbps,
    })
}

fn spawn_quality_poller(
    source: QualitySource,
    sink: EventSink,
    stop: Receiver<()>,
    interval: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut last = (source.read)();
        while let Err(RecvTimeoutError::Timeout) = stop.recv_timeout(interval) {
            let current = (source.read)();
            if let Some(kind) = quality_change(last, current) {
                sink(WifiEvent::new(source.interface.clone(), kind));
            }
            last = current;
        }
        debug!(interface = %source.interface, "link quality poller stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::mpsc::TryRecvError;
    use std::time::Instant;

    const MISSING_PROGRAM: &str = "wifiglance-test-missing-iw";

    fn channel_sink() -> (EventSink, Receiver<WifiEvent>) {
        let (tx, rx) = mpsc::channel();
        let sink: EventSink = Arc::new(move |event| {
            let _ = tx.send(event);
        });
        (sink, rx)
    }

    fn scripted(readings: Vec<Option<LinkQuality>>) -> QualitySource {
        let readings = Mutex::new(readings.into_iter());
        QualitySource {
            interface: "wlan0".to_string(),
            read: Box::new(move || readings.lock().unwrap().next().flatten()),
        }
    }

    fn quality(rssi_dbm: i32, transmit_rate_mbps: f64) -> WifiEventKind {
        WifiEventKind::LinkQualityChanged {
            rssi_dbm,
            transmit_rate_mbps,
        }
    }

    #[test]
    fn quality_change_only_for_new_connected_readings() {
        assert_eq!(quality_change(None, None), None);
        assert_eq!(quality_change(None, Some((-50, 144.0))), Some(quality(-50, 144.0)));
        assert_eq!(quality_change(Some((-50, 144.0)), Some((-50, 144.0))), None);
        assert_eq!(
            quality_change(Some((-50, 144.0)), Some((-50, 72.2))),
            Some(quality(-50, 72.2))
        );
        assert_eq!(quality_change(Some((-50, 144.0)), None), None);
    }

    #[test]
    fn poller_keeps_running_when_event_stream_is_missing() {
        let (sink, rx) = channel_sink();
        let source = scripted(vec![
            None,
            Some((-50, 144.0)),
            Some((-50, 144.0)),
            None,
            Some((-62, 144.0)),
        ]);

        let (listener, result) = IwEventListener::launch(
            MISSING_PROGRAM,
            &EventCategory::ALL,
            sink,
            Some(source),
            Duration::from_millis(1),
        );
        assert!(matches!(
            result,
            Err(WifiError::PlatformOperationFailed {
                operation: "start monitoring",
                ..
            })
        ));

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        drop(listener);

        assert_eq!(first, WifiEvent::new("wlan0", quality(-50, 144.0)));
        assert_eq!(second, WifiEvent::new("wlan0", quality(-62, 144.0)));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn dropping_listener_releases_sink_promptly() {
        let (sink, rx) = channel_sink();
        let (listener, _) = IwEventListener::launch(
            MISSING_PROGRAM,
            &EventCategory::ALL,
            sink,
            Some(scripted(vec![Some((-50, 144.0))])),
            Duration::from_secs(60),
        );

        let started = Instant::now();
        drop(listener);

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn link_quality_without_interface_is_reported() {
        let (sink, _rx) = channel_sink();
        let (_listener, result) = IwEventListener::launch(
            "true",
            &[EventCategory::LinkQualityChanged],
            sink,
            None,
            Duration::from_millis(1),
        );
        assert!(matches!(
            result,
            Err(WifiError::PlatformOperationFailed {
                operation: "monitor link quality",
                ..
            })
        ));
    }

    #[test]
    fn no_poller_unless_link_quality_is_wanted() {
        let (sink, rx) = channel_sink();
        let (listener, _) = IwEventListener::launch(
            MISSING_PROGRAM,
            &[EventCategory::LinkChanged],
            sink,
            Some(scripted(vec![None, Some((-50, 144.0))])),
            Duration::from_millis(1),
        );

        assert!(listener.poller.is_none());
        drop(listener);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }
}
