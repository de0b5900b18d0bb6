/**
 * Minimal harness for the Rollbar reporter.
 *
 * Set ROLLBAR_ACCESS_TOKEN to a project's post_server_item token, then run:
 *
 *   cargo run -p rollbar_demo
 *   cargo run -p rollbar_demo -- --panic     # test panic reporting
 *   cargo run -p rollbar_demo -- --flood     # overflow the queue
 */
use std::time::Duration;

use rollbar::{CoreOptions, Level, ReportedError, RequestInfo};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("rollbar=debug")
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let test_panic = args.iter().any(|a| a == "--panic");
    let flood = args.iter().any(|a| a == "--flood");

    let guard = rollbar::init(rollbar::Options {
        core: CoreOptions {
            access_token: std::env::var("ROLLBAR_ACCESS_TOKEN").unwrap_or_default(),
            environment: "demo".into(),
            queue_capacity: if flood { 5 } else { 1000 },
            request_timeout: Some(Duration::from_secs(10)),
            ..Default::default()
        },
        catch_panics: true,
    });
    let _guard = match guard {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("[demo] failed to initialize reporter: {e}");
            return;
        }
    };

    rollbar::report_message(Level::Info, "Hello from the Rollbar Rust reporter!\nSecond line stays in the body.");
    println!("[demo] Sent a message");

    /*
     * A real typed error (file not found).
     */
    if let Err(e) = std::fs::read_to_string("/nonexistent/path.txt") {
        rollbar::report_error(Level::Error, ReportedError::typed(&e));
        println!("[demo] Sent an io::Error: {e}");
    }

    /*
     * A request-scoped error; the password never leaves the process.
     */
    let request = http::Request::post("/login?next=%2Fhome&token=abc123")
        .header("user-agent", "rollbar-demo")
        .body(())
        .map(|r| RequestInfo::from_http(&r));
    if let Ok(mut request) = request {
        request.form.insert("password".into(), vec!["hunter2".into()]);
        rollbar::report_error_with_request(Level::Warning, "login failed", &request);
        println!("[demo] Sent a request error");
    }

    if flood {
        let accepted = (0..50)
            .filter(|i| rollbar::report_message(Level::Debug, &format!("flood {i}")))
            .count();
        println!("[demo] Flood: {accepted} of 50 accepted");
    }

    if test_panic {
        println!("[demo] Triggering a panic...");
        panic!("Test panic from the Rollbar demo");
    }

    rollbar::wait_until_drained();
    println!("[demo] Done. Queue drained.");
}
