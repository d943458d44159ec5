use crate::reporting::model::{ScanReport, Severity};
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

// ==============================
// BOX CONFIGURATION
// ==============================

const BOX_WIDTH: usize = 70;
const INNER_WIDTH: usize = BOX_WIDTH - 2;

fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

// ==============================
// BOX RENDERING HELPERS
// ==============================

fn top_border() -> String {
    format!("╔{}╗", "═".repeat(INNER_WIDTH))
}

fn middle_border() -> String {
    format!("╠{}╣", "═".repeat(INNER_WIDTH))
}

fn bottom_border() -> String {
    format!("╚{}╝", "═".repeat(INNER_WIDTH))
}

/// Left-aligned box line (emoji-safe)
fn box_line(content: &str) -> String {
    let safe_content = format!(" {} ", content);
    let width = visual_width(&safe_content);

    let padding = INNER_WIDTH.saturating_sub(width);
    format!("║{}{}║", safe_content, " ".repeat(padding))
}

/// Centered box line (emoji-safe)
fn box_line_centered(content: &str) -> String {
    let safe_content = format!(" {} ", content);
    let width = visual_width(&safe_content);

    if width >= INNER_WIDTH {
        return box_line(content);
    }

    let remaining = INNER_WIDTH - width;
    let left = remaining / 2;
    let right = remaining - left;

    format!("║{}{}{}║", " ".repeat(left), safe_content, " ".repeat(right))
}

// ==============================
// MAIN REPORT RENDERER
// ==============================

pub fn render(report: &ScanReport) -> String {
    let mut out = String::new();
    let findings = &report.findings;

    let title = match (findings.is_empty(), report.cancelled) {
        (true, false) => "🎉 SCAN COMPLETE",
        (true, true) => "⏹ SCAN CANCELLED",
        (false, _) => "REFLECTED XSS DETECTED",
    };

    let _ = writeln!(out, "\n{}", top_border());
    let _ = writeln!(out, "{}", box_line_centered(title));
    let _ = writeln!(out, "{}", middle_border());
    let _ = writeln!(out, "{}", box_line(&format!("Target: {}", report.target)));
    let _ = writeln!(
        out,
        "{}",
        box_line(&format!(
            "Pages: {}   Parameters: {}   Requests: {}",
            report.pages_crawled, report.parameters_tested, report.requests_sent
        ))
    );

    if findings.is_empty() {
        let _ = writeln!(out, "{}", box_line("✅ No reflected payloads observed"));
        let _ = writeln!(out, "{}", bottom_border());
        return out;
    }

    let high = findings.iter().filter(|f| f.severity == Severity::High).count();
    let medium = findings.iter().filter(|f| f.severity == Severity::Medium).count();

    let _ = writeln!(out, "{}", box_line(&format!("Total Findings: {}", findings.len())));
    if high > 0 {
        let _ = writeln!(out, "{}", box_line(&format!("🟠 High: {}", high)));
    }
    if medium > 0 {
        let _ = writeln!(out, "{}", box_line(&format!("🟡 Medium: {}", medium)));
    }
    let _ = writeln!(out, "{}\n", bottom_border());

    // ------------------------------
    // DETAILED FINDINGS
    // ------------------------------
    for (idx, f) in findings.iter().enumerate() {
        let _ = writeln!(out, "{}", "═".repeat(80));
        let _ = writeln!(out, "FINDING #{}: Reflected XSS [{}]", idx + 1, f.severity);
        let _ = writeln!(out, "{}", "═".repeat(80));

        let _ = writeln!(out, "\n🎯 LOCATION:");
        let _ = writeln!(out, "   URL:        {}", f.url);
        let _ = writeln!(out, "   Parameter:  {} ({:?})", f.parameter.name, f.parameter.origin);
        let _ = writeln!(out, "   Context:    {}", f.context.context);
        if let Some(defense) = &f.context.defense {
            let _ = writeln!(out, "   Defense:    {}", defense);
        }

        let _ = writeln!(out, "\n💉 PAYLOAD:");
        let _ = writeln!(out, "   {}", f.payload);
        let _ = writeln!(out, "   {}", f.test_url);

        let _ = writeln!(out, "\n🔍 EVIDENCE:");
        let _ = writeln!(out, "   {} ({})", f.evidence, f.cwe);

        let _ = writeln!(out, "\n🛠️ REMEDIATION:");
        for line in f.remediation.lines() {
            let _ = writeln!(out, "   {}", line.trim());
        }

        let _ = writeln!(out, "\n📚 REFERENCES:");
        for (i, reference) in f.references.iter().enumerate() {
            let _ = writeln!(out, "   [{}] {}", i + 1, reference);
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Note: findings come from string reflection, not observed script execution. Verify manually."
    );
    out
}
