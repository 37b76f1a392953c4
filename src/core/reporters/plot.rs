use std::sync::Arc;
use std::time::Duration;
use minijinja::{context, Environment};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use crate::core::reporters::Reporter;
use crate::models::errors::ReportError;
use crate::models::record::{Outcome, Record};
use crate::models::target::Target;

const OK_COLOR: &str = "#8AE234";
const ERR_COLOR: &str = "#FA7878";

/// Standalone HTML page with a latency chart and a table of every record.
///
/// `library` is the charting script embedded verbatim. `targets[i]`, when
/// present, names the request behind the i-th record of the report.
#[derive(Clone)]
pub struct PlotReporter {
    library: Arc<[u8]>,
    targets: Arc<[Target]>,
    title: String,
}

#[derive(Serialize)]
struct Row<'a> {
    timestamp: String,
    code: i32,
    method: &'a str,
    url: &'a str,
    bytes_in: u64,
    bytes_out: u64,
    color: &'static str,
}

impl PlotReporter {
    pub fn new(library: impl Into<Arc<[u8]>>) -> Self {
        PlotReporter {
            library: library.into(),
            targets: Arc::from(Vec::new()),
            title: "Atomic Bomb Plot".to_string(),
        }
    }

    pub fn with_targets(mut self, targets: impl Into<Arc<[Target]>>) -> Self {
        self.targets = targets.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn rows<'a>(&'a self, results: &[Record]) -> Result<Vec<Row<'a>>, ReportError> {
        results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let target = self.targets.get(i);
                Ok(Row {
                    timestamp: OffsetDateTime::from(r.timestamp).format(&Rfc3339)?,
                    code: r.code,
                    method: target.map_or("", |t| t.method.as_str()),
                    url: target.map_or("", |t| t.url.as_str()),
                    bytes_in: r.bytes_in,
                    bytes_out: r.bytes_out,
                    color: if r.is_success() { OK_COLOR } else { ERR_COLOR },
                })
            })
            .collect()
    }
}

impl Reporter for PlotReporter {
    fn report(&self, results: &[Record]) -> Result<Vec<u8>, ReportError> {
        let library = std::str::from_utf8(&self.library)?;
        let rows = self.rows(results)?;
        // a `</script>` in the title must not end the script block
        let title_json = serde_json::to_string(&self.title)?.replace('<', "\\u003c");

        let mut env = Environment::new();
        env.add_template("plot.html", PLOT_TEMPLATE)?;
        let html = env.get_template("plot.html")?.render(context! {
            title => self.title,
            title_json => title_json,
            library => library,
            series => series(results),
            ok_color => OK_COLOR,
            err_color => ERR_COLOR,
            rows => rows,
        })?;
        Ok(html.into_bytes())
    }
}

/// Chart points `[seconds, err_ms, ok_ms]`, one per record, with `NaN` in the
/// slot of the outcome the record did not have.
pub(crate) fn series(results: &[Record]) -> String {
    let Some(first) = results.first() else {
        return String::new();
    };
    let points: Vec<String> = results
        .iter()
        .map(|r| {
            let x = r.timestamp.duration_since(first.timestamp).unwrap_or_default().as_secs_f32();
            match r.outcome() {
                Outcome::Success(latency) => format!("[{},NaN,{}]", x, millis(latency)),
                Outcome::Failure(latency) => format!("[{},{},NaN]", x, millis(latency)),
            }
        })
        .collect();
    points.join(",")
}

fn millis(d: Duration) -> f32 {
    (d.as_secs_f64() * 1000.0) as f32
}

const PLOT_TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>{{ title }}</title>
</head>
<body>
  <div id="latencies" style="font-family: Courier; width: 100%; height: 600px"></div>
  <a href="#" download="plot.png" onclick="this.href = document.getElementsByTagName('canvas')[0].toDataURL('image/png').replace(/^data:image\/[^;]/, 'data:application/octet-stream')">Download as PNG</a>
  <script>
{{ library|safe }}
  </script>
  <script>
  new Dygraph(
    document.getElementById("latencies"),
    [{{ series|safe }}],
    {
      title: {{ title_json|safe }},
      labels: ['Seconds', 'ERR', 'OK'],
      ylabel: 'Latency (ms)',
      xlabel: 'Seconds elapsed',
      showRoller: true,
      colors: ['{{ err_color }}', '{{ ok_color }}'],
      legend: 'always',
      logscale: true,
      strokeWidth: 1.3,
      showRangeSelector: true,
      rangeSelectorHeight: 30
    }
  );
  </script>
  <table style="text-align: center">
    <tr>
      <th>Timestamp</th>
      <th>Return Code</th>
      <th>Method</th>
      <th>URL</th>
      <th>In (bytes)</th>
      <th>Out (bytes)</th>
    </tr>
    {%- for row in rows %}
    <tr bgcolor="{{ row.color }}">
      <td align="center" valign="middle">{{ row.timestamp }}</td>
      <td align="center" valign="middle">{{ row.code }}</td>
      <td align="center" valign="middle">{{ row.method }}</td>
      <td align="left" valign="middle"><a href="{{ row.url }}">{{ row.url }}</a></td>
      <td align="center" valign="middle">{{ row.bytes_in }}</td>
      <td align="center" valign="middle">{{ row.bytes_out }}</td>
    </tr>
    {%- else %}
    <tr><td colspan="6"><b>No Results found</b></td></tr>
    {%- endfor %}
  </table>
</body>
</html>
"##;
