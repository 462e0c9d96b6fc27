use flbout::decode::{BodyShape, EventStreamDecoder};
use tracing::warn;

use crate::cmd::{read_batch, StatsArgs};
use crate::exit::{decode_error, CliResult, SUCCESS};
use crate::output::{print_stats, OutputFormat, StatsOutput};

pub fn run(args: StatsArgs, format: OutputFormat) -> CliResult<i32> {
    let batch = read_batch(&args.path)?;
    let mut decoder = EventStreamDecoder::with_config(&batch, args.decoder.to_config());

    let mut plain = 0usize;
    let mut with_metadata = 0usize;
    loop {
        match decoder.next_event() {
            Ok(Some(event)) => match event.shape {
                BodyShape::Plain => plain += 1,
                BodyShape::WithMetadata => with_metadata += 1,
            },
            Ok(None) => break,
            Err(err) => {
                let index = plain + with_metadata;
                warn!(
                    path = %args.path.display(),
                    event_index = index,
                    error = %err,
                    "batch decode failed"
                );
                return Err(decode_error(
                    &format!("event {index} in {}", args.path.display()),
                    err,
                ));
            }
        }
    }

    let stats = StatsOutput {
        path: args.path.display().to_string(),
        events: plain + with_metadata,
        plain,
        with_metadata,
        bytes_consumed: decoder.position(),
        bytes_total: batch.len(),
    };
    print_stats(&stats, format);

    Ok(SUCCESS)
}
