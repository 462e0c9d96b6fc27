use flbout::decode::EventStreamDecoder;
use tracing::{debug, warn};

use crate::cmd::{read_batch, DecodeArgs};
use crate::exit::{decode_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_events, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.limit == Some(0) {
        return Err(CliError::new(USAGE, "--limit must be greater than zero"));
    }

    let batch = read_batch(&args.path)?;
    let mut decoder = EventStreamDecoder::with_config(&batch, args.decoder.to_config());
    let mut events = Vec::new();
    let mut failure = None;

    while args.limit.is_none_or(|limit| events.len() < limit) {
        match decoder.next_event() {
            Ok(Some(event)) => events.push(event),
            Ok(None) => break,
            Err(err) => {
                warn!(
                    path = %args.path.display(),
                    event_index = events.len(),
                    error = %err,
                    "batch decode failed"
                );
                failure = Some(err);
                break;
            }
        }
    }

    debug!(
        events = events.len(),
        consumed = decoder.position(),
        total = batch.len(),
        "decode finished"
    );

    // Events decoded before a failure are still shown.
    print_events(&events, format);

    match failure {
        Some(err) => Err(decode_error(
            &format!("event {} in {}", events.len(), args.path.display()),
            err,
        )),
        None => Ok(SUCCESS),
    }
}
