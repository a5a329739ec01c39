//! `rfetch get <url>` – GET with retries; Ctrl-C cancels between attempts.

use anyhow::{Context as _, Result};
use rfetch_core::config::FetchConfig;
use rfetch_core::{
    fetch_json, get_retry, Context, CurlTransport, Query, Response, RetryError, RetryPolicy,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::GetArgs;

enum Output {
    Raw(Response),
    Json(serde_json::Value),
}

fn print_response(resp: &Response, include: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if include {
        writeln!(out, "{}", resp.status_line())?;
        for (name, value) in resp.headers() {
            writeln!(out, "{}: {}", name, value)?;
        }
        writeln!(out)?;
    }
    out.write_all(resp.body())?;
    out.flush()?;
    Ok(())
}

pub async fn run_get(cfg: &FetchConfig, args: GetArgs) -> Result<()> {
    let policy = RetryPolicy::from(&args.retry_config(&cfg.retry));
    let transport = CurlTransport::from(&cfg.transport);
    let mut ctx = Context::background().with_transport(Arc::new(transport));
    if let Some(secs) = args.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }
    let (ctx, cancel) = ctx.with_cancel();
    let query: Query = args.query.iter().cloned().collect();
    tracing::info!("GET {} ({:?})", args.url, policy);

    let mut task = tokio::task::spawn_blocking({
        let url = args.url.clone();
        let json = args.json;
        move || -> Result<Output, RetryError> {
            let query = (!query.is_empty()).then_some(&query);
            if json {
                fetch_json(&ctx, &url, query, Some(&policy)).map(Output::Json)
            } else {
                get_retry(&ctx, &url, query, Some(&policy)).map(Output::Raw)
            }
        }
    });

    let result = tokio::select! {
        res = &mut task => res.context("fetch task join")?,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            eprintln!("interrupted; stopping after the current attempt");
            task.await.context("fetch task join")?
        }
    };

    // RetryError already carries its cause in the message.
    match result.map_err(|e| anyhow::anyhow!("{}", e))? {
        Output::Raw(resp) => print_response(&resp, args.include)?,
        Output::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}
