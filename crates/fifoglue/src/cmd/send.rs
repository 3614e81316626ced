use std::fs;

use fifoglue_endpoint::Registry;
use fifoglue_frame::Msg;

use crate::cmd::SendArgs;
use crate::exit::{endpoint_error, frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};

pub fn run(args: SendArgs, registry: &Registry) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let msg = Msg::new(args.header.as_str(), payload)
        .map_err(|err| frame_error("invalid message", err))?;

    let sent = if args.no_wait {
        registry.try_send(&msg, &args.name)
    } else {
        registry.send(&msg, &args.name)
    };
    sent.map_err(|err| endpoint_error("send failed", err))?;

    tracing::debug!(endpoint = %args.name, size = msg.wire_len(), "sent");
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<String> {
    if let Some(data) = &args.data {
        return Ok(data.clone());
    }
    if let Some(path) = &args.file {
        let bytes = fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        let text = String::from_utf8(bytes).map_err(|_| {
            CliError::new(
                DATA_INVALID,
                format!("{} is not valid UTF-8", path.display()),
            )
        })?;
        // Files usually end with a newline the user did not mean to send.
        return Ok(text.strip_suffix('\n').unwrap_or(&text).to_string());
    }
    Ok(String::new())
}
