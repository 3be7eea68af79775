//! Headless property inspector for the Advanced Counter action.
//!
//! Reads edits from stdin (`value 7`, `step 2`, `file /tmp/count.txt`, `pattern Count: {}`,
//! `file` alone clears it) and prints the form as one JSON line whenever it changes.

mod args;

use args::Args;
use counter_core::{FieldEdit, FormEvent, FormField, SyncClient};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc, oneshot};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse(std::env::args().skip(1).collect())?;
    log::info!(
        "counter-pi starting (pid={}, args={args:?})",
        std::process::id()
    );

    // The form, the socket and the edit loop all share one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(args));
    // A pending stdin read must not hold up exit.
    runtime.shutdown_background();
    result
}

async fn run(args: Args) -> anyhow::Result<()> {
    let client = SyncClient::default();
    let events = client.subscribe();
    let (init_tx, init_rx) = oneshot::channel();
    let (edit_tx, edit_rx) = mpsc::unbounded_channel();

    let renderer = tokio::spawn(render(events, tokio::io::stdout()));
    tokio::spawn(read_edits(edit_tx));

    // Acting as host bridge: deliver the parameters exactly once.
    if init_tx.send(args.into_params()?).is_err() {
        anyhow::bail!("sync client stopped before initialization");
    }

    let result = client.run(init_rx, edit_rx).await;
    // The client dropped its sender; let the renderer print what is still queued.
    renderer.await?;
    let form = result?;
    log::info!("backend disconnected, final settings: {:?}", form.settings());
    Ok(())
}

fn parse_edit(line: &str) -> anyhow::Result<FieldEdit> {
    let (field, raw) = line.split_once(' ').unwrap_or((line, ""));
    Ok(FieldEdit::new(field.parse::<FormField>()?, raw))
}

async fn read_edits(edits: mpsc::UnboundedSender<FieldEdit>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                log::warn!("failed to read stdin: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_edit(&line) {
            Ok(edit) => {
                if edits.send(edit).is_err() {
                    break;
                }
            }
            Err(err) => log::warn!("{err:#}"),
        }
    }
}

/// Print every form change as one JSON line. Returns once the client is gone.
async fn render<W>(mut events: broadcast::Receiver<FormEvent>, mut out: W)
where
    W: AsyncWrite + Unpin,
{
    loop {
        match events.recv().await {
            Ok(FormEvent::Changed { settings, origin }) => {
                log::debug!("form changed ({origin:?})");
                let line = match serde_json::to_string(&settings) {
                    Ok(line) => line,
                    Err(err) => {
                        log::error!("failed to render settings: {err}");
                        continue;
                    }
                };
                let written = async {
                    out.write_all(line.as_bytes()).await?;
                    out.write_all(b"\n").await?;
                    out.flush().await
                };
                if let Err(err) = written.await {
                    log::warn!("failed to write settings: {err}");
                    break;
                }
            }
            Ok(FormEvent::Connected { context }) => log::info!("connected (context={context})"),
            Ok(FormEvent::Disconnected) => log::info!("disconnected"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::debug!("render lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
