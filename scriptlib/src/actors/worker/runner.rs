use crate::cancel::CancelToken;
use crate::command::Invocation;
use crate::events::{Failure, Outcome, OutputEvent};
use crate::logfile::{Header, SessionLog};
use crate::marshal::EventSink;
use crate::session::RunSession;
use crate::settings::Settings;

use bytes::Bytes;
use std::{
    io::{self, PipeReader, Read},
    path::Path,
    process::{Child, Command, Stdio},
    thread,
    time::Duration,
};
use tracing::{debug, info, warn};

/// Size of a single read from the child's output.
pub const CHUNK_SIZE: usize = 1024;

/// Run one session to completion on the calling thread.
///
/// Emits `Started`, then one `Line` per chunk of output, then exactly one
/// terminal event. The session log is closed before the terminal event goes out.
pub fn run<S: EventSink>(session: RunSession, settings: &Settings, sink: &mut S) {
    let command = session.invocation.to_string();
    info!(session = %session.id, script = %session.job.id, %command, "starting script");

    let mut log = SessionLog::open(
        &settings.log_file,
        &Header {
            started: session.started,
            session: session.id,
            command: &command,
            script: &session.job.name,
        },
    );
    sink.emit(OutputEvent::Started {
        session: session.id,
        command: command.clone(),
        script: session.job.name.clone(),
        timestamp: session.started,
    });

    let outcome = match spawn(&session.invocation, settings.working_dir.as_deref()) {
        Ok((child, output)) => stream(
            child,
            output,
            &session.cancel,
            settings.poll_interval,
            &mut log,
            sink,
        ),
        Err(err) => {
            warn!(session = %session.id, %command, %err, "failed to spawn script");
            Outcome::Failed(Failure::Spawn(err.to_string()))
        }
    };

    let duration = session.elapsed();
    log.close(&outcome, duration);
    info!(session = %session.id, %outcome, seconds = duration.as_secs(), "script finished");
    sink.emit(outcome.into_event(duration));
}

/// Start the child with stdout and stderr both writing into one pipe.
fn spawn(invocation: &Invocation, working_dir: Option<&Path>) -> io::Result<(Child, PipeReader)> {
    let (reader, writer) = io::pipe()?;
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }
    let child = command.spawn()?;
    // the command still holds our copies of the write end; the reader only
    // sees end-of-stream once they are gone
    drop(command);
    Ok((child, reader))
}

fn stream<R: Read, S: EventSink>(
    mut child: Child,
    mut output: R,
    cancel: &CancelToken,
    poll_interval: Duration,
    log: &mut SessionLog,
    sink: &mut S,
) -> Outcome {
    let mut buf = [0u8; CHUNK_SIZE];

    let mut cancelled = false;
    loop {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        // blocks until the child writes or closes its output
        match output.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                debug!(bytes = n, "read output chunk");
                forward(&buf[..n], log, sink);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                warn!(%err, "failed to read script output");
                break;
            }
        }
        if !poll_interval.is_zero() {
            thread::sleep(poll_interval);
        }
    }
    // nobody reads past this point; a child still writing must not block on a full pipe
    drop(output);

    if cancelled {
        // only our side stops reading; the child is left running
        reap_detached(child);
        return Outcome::Cancelled;
    }

    match child.wait() {
        Ok(status) => Outcome::from_status(status),
        Err(err) => Outcome::Failed(Failure::Wait(err.to_string())),
    }
}

fn forward<S: EventSink>(chunk: &[u8], log: &mut SessionLog, sink: &mut S) {
    log.append(chunk);
    sink.emit(OutputEvent::Line {
        data: Bytes::copy_from_slice(chunk),
    });
}

/// Wait for an abandoned child in the background so it does not linger as a zombie.
fn reap_detached(mut child: Child) {
    let pid = child.id();
    let reaper = thread::Builder::new()
        .name("script-reaper".into())
        .spawn(move || match child.wait() {
            Ok(status) => debug!(pid, %status, "cancelled script exited"),
            Err(err) => warn!(pid, %err, "failed to reap cancelled script"),
        });
    if let Err(err) = reaper {
        warn!(pid, %err, "failed to start reaper for cancelled script");
    }
}
