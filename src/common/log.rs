use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

const DEFAULT_DIRECTIVES: &str = "trellis=info,trellis_wm=info";

/// Installs the global subscriber. Nested command invocations show up as
/// indented spans under the command that issued them.
pub fn init_logging(verbose: bool) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) if verbose => EnvFilter::builder().parse_lossy("trellis=trace,trellis_wm=trace"),
        Err(_) => EnvFilter::builder().parse_lossy(DEFAULT_DIRECTIVES),
    };

    let tree = HierarchicalLayer::default()
        .with_indent_amount(2)
        .with_indent_lines(true)
        .with_targets(true)
        .with_deferred_spans(true)
        .with_span_retrace(true);

    let _ = tracing_subscriber::registry().with(filter).with(tree).try_init();
}
