use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncRead, AsyncWriteExt};
use atomic_bomb_report::core::logging;
use atomic_bomb_report::models::args::{Args, ReportType};
use atomic_bomb_report::{report_json, report_text, Collector, HistogramReporter, PlotReporter, Reporter};

type Source = Box<dyn AsyncRead + Send + Unpin>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    let mut sources: Vec<Source> = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        if input == "-" {
            sources.push(Box::new(tokio::io::stdin()));
        } else {
            let file = tokio::fs::File::open(input)
                .await
                .with_context(|| format!("opening {}", input))?;
            sources.push(Box::new(file));
        }
    }

    let drained = Collector::new(args.collector_config())
        .collect(sources)
        .drain()
        .await?;
    for aborted in drained.errors.iter().filter(|e| e.error.is_fatal()) {
        tracing::error!(input = %args.inputs[aborted.index], "{}", aborted.error);
    }
    tracing::info!(
        records = drained.results.len(),
        errors = drained.errors.len(),
        "results collected"
    );

    let reporter: Box<dyn Reporter> = match args.report_type {
        ReportType::Text => Box::new(report_text),
        ReportType::Json => Box::new(report_json),
        ReportType::Hist => Box::new(HistogramReporter::default()),
        ReportType::Plot => {
            let library = match &args.plot_library {
                Some(path) => tokio::fs::read(path)
                    .await
                    .with_context(|| format!("reading plot library {}", path.display()))?,
                None => {
                    tracing::warn!("no --plot-library given, the chart will not render");
                    Vec::new()
                }
            };
            Box::new(PlotReporter::new(library).with_title(args.title.clone()))
        }
    };
    let report = reporter
        .report(&drained.results)
        .context("rendering report")?;

    if args.output == "-" {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&report).await?;
        stdout.flush().await?;
    } else {
        tokio::fs::write(&args.output, &report)
            .await
            .with_context(|| format!("writing {}", args.output))?;
    }
    Ok(())
}
