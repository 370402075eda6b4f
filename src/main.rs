use std::env;

const DEFAULT_LOG_FILTER: &str = "quant_advisor=info";

fn init_tracing() {
    // Stdout is reserved for the advise JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = quant_advisor::api::run_http_server(port).await {
            eprintln!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    if raw_args.get(1).map(|s| s.as_str()) == Some("advise") {
        let mut args = raw_args;
        args.remove(1);
        if let Err(e) = quant_advisor::api::run_one_shot(args).await {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    eprintln!("Usage: cargo run -- serve [port]");
    eprintln!("       cargo run -- advise --age <AGE> --income <INCOME> [options]");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_is_a_valid_directive() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
