//! Operator-toggleable pipeline stages

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Breadth-first crawl from the seed (off = seed URL only)
    Crawl,
    /// Script-context inference from the reconnaissance response
    ContextDetection,
    /// WAF / protective middleware fingerprinting
    DefenseDetection,
    /// Context- and defense-specific payload selection (off = basic catalog)
    AdaptivePayloads,
}
