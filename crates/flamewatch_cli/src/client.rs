use std::future::Future;

use flamewatch::config::DashboardConfig;
use flamewatch::flame::NodeId;
use flamewatch::session::{Dispatch, Session, SessionError, SessionHost, TimerKind};
use flamewatch::widget::FlameGraph;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

use crate::host::TokioHost;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connect to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// How the client reports what it receives.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub top: usize,
    pub search: Option<String>,
    pub width: u32,
}

/// Connect, poll and log until the producer closes the socket or Ctrl-C.
pub async fn run(url: &str, config: DashboardConfig, report: ReportOptions) -> Result<(), ClientError> {
    info!(%url, "connecting");
    let (ws, _) = connect_async(url).await.map_err(|source| ClientError::Connect {
        url: url.to_string(),
        source,
    })?;
    let (sink, stream) = ws.split();

    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let host = TokioHost::new(out_tx, tick_tx, report.width);
    let mut session = Session::new(host, FlameGraph::new(config.flame.clone()), config);

    if let Some(term) = &report.search {
        session.search(term);
    }
    session.start()?;
    session.on_open()?;

    let queues = HostQueues {
        outgoing: out_rx,
        ticks: tick_rx,
    };
    let interrupted = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    pump(&mut session, &report, stream, sink, queues, interrupted).await?;

    info!(duration = %session.status().duration, "session ended");
    Ok(())
}

/// Receiving ends of the channels a [`TokioHost`] writes to.
pub struct HostQueues {
    pub outgoing: mpsc::UnboundedReceiver<String>,
    pub ticks: mpsc::UnboundedReceiver<TimerKind>,
}

/// Shuttle frames, queued requests and timer ticks until the socket ends or
/// `shutdown` resolves.
pub async fn pump<S, K, F>(
    session: &mut Session<TokioHost, FlameGraph>,
    report: &ReportOptions,
    mut stream: S,
    mut sink: K,
    mut queues: HostQueues,
    shutdown: F,
) -> Result<(), ClientError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
    K: Sink<Message> + Unpin,
    K::Error: std::fmt::Display,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match session.on_message(&text) {
                    Ok(Dispatch::Sample) => log_report(session, report),
                    Ok(Dispatch::Info) => {
                        let status = session.status();
                        info!(pid = %status.pid, command = %status.command, "attached");
                    }
                    Ok(Dispatch::Ignored(kind)) => debug!(%kind, "ignored message"),
                    Err(err) => warn!(error = %err, "bad message"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    session.on_close();
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(error = %err, "socket error");
                    session.on_close();
                    break;
                }
            },
            Some(text) = queues.outgoing.recv() => {
                if let Err(err) = sink.send(Message::Text(text)).await {
                    warn!(error = %err, "send failed");
                    session.on_close();
                    break;
                }
            }
            Some(kind) = queues.ticks.recv() => {
                session.on_timer(kind)?;
            }
            _ = &mut shutdown => {
                info!("interrupted");
                session.shutdown();
                let _ = sink.close().await;
                break;
            }
        }
    }
    Ok(())
}

/// Status line, search summary and the hottest frames with their labels.
pub fn log_report<H: SessionHost>(session: &Session<H, FlameGraph>, report: &ReportOptions) {
    let status = session.status();
    info!(
        duration = %status.duration,
        samples = %status.samples,
        cpu = %status.cpu,
        memory = %status.memory,
        "sample"
    );

    let graph = session.flame().widget();
    if let Some(summary) = graph.search_summary() {
        info!("{}", graph.details(None));
        debug!(matches = summary.matches, percent = summary.percent, "search");
    }
    for line in hottest_labels(graph, report.top) {
        info!("  {line}");
    }
}

pub fn hottest_labels(graph: &FlameGraph, top: usize) -> Vec<String> {
    graph
        .tree()
        .hottest(top)
        .into_iter()
        .filter(|id| *id != NodeId::ROOT)
        .map(|id| graph.label(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flamewatch::session::ConnectionState;
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;
    use std::time::Duration;

    fn replay<H: SessionHost>(
        session: &mut Session<H, FlameGraph>,
        messages: &[&str],
    ) -> Vec<Result<Dispatch, SessionError>> {
        messages.iter().map(|m| session.on_message(m)).collect()
    }

    fn offline_session() -> Session<TokioHost, FlameGraph> {
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let (tick_tx, _tick_rx) = mpsc::unbounded_channel();
        let config = DashboardConfig::default();
        Session::new(
            TokioHost::new(out_tx, tick_tx, 800),
            FlameGraph::new(config.flame.clone()),
            config,
        )
    }

    const SAMPLE: &str = r#"{"type":"sample","height":2,"samples":4,"cpu":10,"memory":32,
        "data":{"name":"root","value":2000000000,"children":[
            {"name":"MainThread","value":2000000000,"children":[
                {"name":"work","value":1000000000}]}]}}"#;

    #[test]
    fn hottest_labels_carry_time_and_share() {
        let mut session = offline_session();
        let results = replay(&mut session, &[SAMPLE]);
        assert!(matches!(results[0], Ok(Dispatch::Sample)));

        let lines = hottest_labels(session.flame().widget(), 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("MainThread 🕘 "));
        assert!(lines[1].starts_with("work 🕘 00:16:40"));
        assert!(lines[1].ends_with("(50.00%)"));
    }

    #[test]
    fn replay_reports_bad_messages_without_stopping() {
        let mut session = offline_session();
        let results = replay(
            &mut session,
            &["{", r#"{"type":"info","pid":9,"command":"app"}"#, r#"{"type":"other"}"#],
        );
        assert!(results[0].is_err());
        assert!(matches!(results[1], Ok(Dispatch::Info)));
        assert!(matches!(results[2], Ok(Dispatch::Ignored(_))));
        assert_eq!(session.status().pid, "9");
    }

    fn report() -> ReportOptions {
        ReportOptions {
            top: 0,
            search: None,
            width: 800,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_outlives_timer_ticks() {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let config = DashboardConfig::default();
        let mut session = Session::new(
            TokioHost::new(out_tx, tick_tx, 800),
            FlameGraph::new(config.flame.clone()),
            config,
        );
        session.start().unwrap();
        session.on_open().unwrap();

        let queues = HostQueues {
            outgoing: out_rx,
            ticks: tick_rx,
        };
        let sent = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&sent);
        let sink = futures_util::sink::unfold((), move |(), msg: Message| {
            record.borrow_mut().push(msg);
            async { Ok::<_, Infallible>(()) }
        });
        tokio::pin!(sink);

        // The duration ticker fires every second, well inside the deadline.
        let deadline = tokio::time::sleep(Duration::from_millis(10_000));
        pump(
            &mut session,
            &report(),
            futures_util::stream::pending(),
            sink,
            queues,
            deadline,
        )
        .await
        .unwrap();

        assert_eq!(session.state(), ConnectionState::Closed);
        assert_eq!(session.host().active_timers(), 0);
        // The request sent on open plus polls at 3s, 6s and 9s.
        assert_eq!(*sent.borrow(), vec![Message::Text("data".to_string()); 4]);
    }

    #[tokio::test]
    async fn pump_stops_when_the_producer_closes() {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let config = DashboardConfig::default();
        let mut session = Session::new(
            TokioHost::new(out_tx, tick_tx, 800),
            FlameGraph::new(config.flame.clone()),
            config,
        );
        session.start().unwrap();
        session.on_open().unwrap();

        let frames = futures_util::stream::iter(vec![
            Ok(Message::Text(SAMPLE.to_string())),
            Ok(Message::Close(None)),
        ]);
        let queues = HostQueues {
            outgoing: out_rx,
            ticks: tick_rx,
        };
        pump(
            &mut session,
            &report(),
            frames,
            futures_util::sink::drain(),
            queues,
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(session.state(), ConnectionState::Closed);
        assert_eq!(session.status().samples, "4");
    }

    #[test]
    fn top_zero_lists_nothing() {
        let mut session = offline_session();
        replay(&mut session, &[SAMPLE]);
        assert!(hottest_labels(session.flame().widget(), 0).is_empty());
    }
}
