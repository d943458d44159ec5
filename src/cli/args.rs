use clap::Parser;
use std::path::PathBuf;

/// XSSCOUT – crawl-driven reflected XSS discovery
#[derive(Parser, Debug)]
#[command(
    name = "xsscout",
    version,
    about = "XSSCOUT – crawl-driven reflected XSS discovery",
    long_about = r#"
XSSCOUT crawls a target, infers injection points and probes each one with
context-appropriate payloads.

PIPELINE:
  • Crawl: breadth-first, same-origin, bounded by --depth and --max-pages
  • Parameter discovery: query keys, typed path segments, REST resource ids,
    form controls, data/meta attributes, inline script analysis
  • Context & WAF detection: one reconnaissance request per URL
  • Payload selection: context catalog + WAF bypass forms when blocked
  • Probing: first reflecting payload per parameter is reported

MANUAL MODE:
  Put FUZZ where the value should go to scan a single injection point,
  e.g. https://example.com/search?q=FUZZ. Crawling is skipped and the
  attribute/URL contexts become detectable.

NOTE:
  Detection is a reflection heuristic (verbatim, entity-encoded or trigger
  token co-occurrence). It does not execute script; confirm findings manually.
"#,
    after_help = r#"EXAMPLES:
  xsscout -t example.com
  xsscout -t https://example.com --depth 3 --max-pages 50 --delay 250
  xsscout -t "https://example.com/search?q=FUZZ"
  xsscout -t https://example.com --cookie "session=abc" -H "Authorization: Bearer t"
  xsscout -t https://example.com --format json -o report.json"#
)]
pub struct Cli {
    /// Target URL or bare domain (https:// is assumed when no scheme is given)
    #[arg(short, long, required = true)]
    pub target: String,

    // ═══════════════════════════════════════════════════════════════════
    // CRAWL
    // ═══════════════════════════════════════════════════════════════════

    /// Crawl depth limit
    #[arg(long, default_value_t = 2, help_heading = "CRAWL")]
    pub depth: usize,

    /// Maximum number of pages to discover
    #[arg(long = "max-pages", default_value_t = 20, help_heading = "CRAWL")]
    pub max_pages: usize,

    /// Scan only the target URL
    #[arg(long = "no-crawl", help_heading = "CRAWL")]
    pub no_crawl: bool,

    /// Do not follow HTTP redirects
    #[arg(long = "no-redirects", help_heading = "CRAWL")]
    pub no_redirects: bool,

    // ═══════════════════════════════════════════════════════════════════
    // DETECTION
    // ═══════════════════════════════════════════════════════════════════

    /// Disable script-context detection
    #[arg(long = "no-context", help_heading = "DETECTION")]
    pub no_context: bool,

    /// Disable WAF / protective middleware detection
    #[arg(long = "no-waf", help_heading = "DETECTION")]
    pub no_waf: bool,

    /// Use the basic payload catalog only
    #[arg(long = "no-adaptive", help_heading = "DETECTION")]
    pub no_adaptive: bool,

    /// Extra payload file (one per line, # for comments)
    #[arg(long, help_heading = "DETECTION")]
    pub payloads: Option<PathBuf>,

    /// Maximum payloads to test per parameter (0 = all)
    #[arg(long = "max-payloads", default_value_t = 0, help_heading = "DETECTION")]
    pub max_payloads: usize,

    // ═══════════════════════════════════════════════════════════════════
    // AUTHENTICATION
    // ═══════════════════════════════════════════════════════════════════

    /// Cookie string for authenticated scanning
    #[arg(long, help_heading = "AUTHENTICATION")]
    pub cookie: Option<String>,

    /// HTTP headers (can be used multiple times)
    #[arg(long = "header", short = 'H', help_heading = "AUTHENTICATION")]
    pub headers: Vec<String>,

    // ═══════════════════════════════════════════════════════════════════
    // PERFORMANCE
    // ═══════════════════════════════════════════════════════════════════

    /// Delay before every probe request, in milliseconds
    #[arg(long, default_value_t = 500, help_heading = "PERFORMANCE")]
    pub delay: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, help_heading = "PERFORMANCE")]
    pub timeout: u64,

    /// Maximum simultaneous requests to the target
    #[arg(long, default_value_t = 1, help_heading = "PERFORMANCE")]
    pub concurrency: usize,

    // ═══════════════════════════════════════════════════════════════════
    // OUTPUT
    // ═══════════════════════════════════════════════════════════════════

    /// Skip the banner display
    #[arg(long, help_heading = "OUTPUT")]
    pub no_banner: bool,

    /// Quiet mode (warnings and findings only)
    #[arg(short, long, help_heading = "OUTPUT")]
    pub quiet: bool,

    /// Verbose output (debug level)
    #[arg(short, long, help_heading = "OUTPUT")]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", help_heading = "OUTPUT")]
    pub format: String,

    /// Output file path
    #[arg(short, long, help_heading = "OUTPUT")]
    pub output: Option<String>,
}
