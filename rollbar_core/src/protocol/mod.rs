/*!
 * Protocol layer: the report model and its wire format.
 *
 * Everything related to *what* we send to the Rollbar API:
 * - `types`: Report envelope, body variants, frames, request context
 * - `constants`: notifier identity, platform tags, configuration defaults
 */

pub mod constants;
pub mod types;
