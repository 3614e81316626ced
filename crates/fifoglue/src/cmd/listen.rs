use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use fifoglue_endpoint::{Endpoint, EndpointError, Registry};
use fifoglue_frame::Msg;

use crate::cmd::ListenArgs;
use crate::exit::{endpoint_error, CliError, CliResult, INTERNAL, LISTENER_FAILED, SUCCESS};
use crate::output::{print_msg, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const CLOSE_WAIT: Duration = Duration::from_secs(1);

pub fn run(args: ListenArgs, registry: &Registry, format: OutputFormat) -> CliResult<i32> {
    let endpoint = registry
        .register(&args.name)
        .map_err(|err| endpoint_error("register failed", err))?;
    tracing::info!(endpoint = %args.name, path = %endpoint.path().display(), "listening");

    let running = Arc::new(AtomicBool::new(true));
    let outcome = install_ctrlc_handler(running.clone())
        .and_then(|()| receive(&endpoint, &args, &running, format));

    // Someone else may already have unregistered us; that is how the
    // listener ended, not a failure of this command.
    match registry.unregister(&args.name) {
        Ok(()) | Err(EndpointError::NoSuchEndpoint(_)) => {}
        Err(err) => {
            let err = endpoint_error("unregister failed", err);
            return outcome.and(Err(err));
        }
    }
    outcome
}

fn receive(
    endpoint: &Endpoint,
    args: &ListenArgs,
    running: &AtomicBool,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let msg = match endpoint.inbox().recv_timeout(POLL_INTERVAL) {
            Ok(msg) => msg,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return closed(endpoint),
        };

        print_msg(&msg, endpoint.name(), format);
        printed = printed.saturating_add(1);

        if is_last(&msg, printed, args) {
            return Ok(SUCCESS);
        }
    }

    Ok(SUCCESS)
}

fn is_last(msg: &Msg, printed: usize, args: &ListenArgs) -> bool {
    if args.count.is_some_and(|count| printed >= count) {
        return true;
    }
    args.until
        .as_deref()
        .is_some_and(|until| msg.payload() == until)
}

/// The inbox closes just before liveness records the cause.
fn closed(endpoint: &Endpoint) -> CliResult<i32> {
    match endpoint.liveness().wait_timeout(CLOSE_WAIT) {
        Some(cause) if cause.is_requested() => {
            tracing::info!(endpoint = %endpoint.name(), "unregistered");
            Ok(SUCCESS)
        }
        Some(cause) => Err(CliError::new(
            LISTENER_FAILED,
            format!("listener for {} stopped: {cause}", endpoint.name()),
        )),
        None => Err(CliError::new(
            INTERNAL,
            format!("inbox for {} closed while listener alive", endpoint.name()),
        )),
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
