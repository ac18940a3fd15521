//! UDP sentence listener.
//!
//! One task owns the socket and the pipeline. Each datagram may carry several
//! newline-separated sentences; outcomes are printed as they complete.

use std::future::Future;
use std::io::{self, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::net::UdpSocket;
use tokio::time::MissedTickBehavior;
use tracing::{trace, warn};

use ais_core::Pipeline;

use crate::output::Printer;

/// Largest UDP payload.
const MAX_DATAGRAM: usize = 65_535;

/// How often stalled multi-sentence messages are checked for eviction.
const EXPIRE_INTERVAL: Duration = Duration::from_secs(1);

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Receive and decode until `shutdown` resolves, then flush any in-flight message.
pub async fn serve<W, F>(
    socket: UdpSocket,
    pipeline: &mut Pipeline,
    printer: &mut Printer<W>,
    shutdown: F,
) -> io::Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut tick = tokio::time::interval(EXPIRE_INTERVAL);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, peer)) => {
                        trace!(%peer, bytes = len, "datagram");
                        let text = String::from_utf8_lossy(&buf[..len]);
                        let now = unix_now();
                        for line in text.lines() {
                            for outcome in pipeline.feed(line, now) {
                                printer.outcome(&outcome)?;
                            }
                        }
                    }
                    Err(e) => warn!(error = %e, "receive failed"),
                }
            }
            _ = tick.tick() => {
                if let Some(outcome) = pipeline.expire(unix_now()) {
                    printer.outcome(&outcome)?;
                }
            }
            _ = &mut shutdown => break,
        }
    }

    if let Some(outcome) = pipeline.finish() {
        printer.outcome(&outcome)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ais_core::config::OutputFormat;
    use tokio::sync::oneshot;

    const FINNMILL_1: &str =
        "!AIVDM,2,1,5,A,53uuBt02<Tg1<<Tv220HTpplThj222222222221?1rc<>Ho<0@0TQCADR0EQ,0*58";
    const FINNMILL_2: &str = "!AIVDM,2,2,5,A,C`888888880,2*02";
    const TYPE1: &str = "!AIVDM,1,1,,A,13QWhR012COJ`0TDSdkCS2ph0@=j,0*6C";

    #[tokio::test]
    async fn test_serve_decodes_datagrams() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let mut pipeline = Pipeline::default();
        let mut printer = Printer::new(Vec::new(), OutputFormat::Json, true);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let sender = async {
            let tx = UdpSocket::bind("127.0.0.1:0").await.unwrap();
            tx.send_to(TYPE1.as_bytes(), addr).await.unwrap();
            // Both fragments in one datagram
            let both = format!("{FINNMILL_1}\r\n{FINNMILL_2}\r\n");
            tx.send_to(both.as_bytes(), addr).await.unwrap();
            // Left in flight until shutdown
            tx.send_to(FINNMILL_1.as_bytes(), addr).await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            stop_tx.send(()).unwrap();
        };
        let shutdown = async {
            let _ = stop_rx.await;
        };

        let (served, ()) = tokio::join!(
            serve(socket, &mut pipeline, &mut printer, shutdown),
            sender
        );
        served.unwrap();

        let text = String::from_utf8(printer.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["raw_fields"]["MMSI"], 236581000);
        assert_eq!(lines[1]["type_code"], 5);
        assert_eq!(lines[1]["display_fields"]["Vessel Name"], "FINNMILL");
        assert!(lines[2]["error"].as_str().unwrap().contains("incomplete"));
        assert_eq!(pipeline.stats().messages, 2);
    }
}
