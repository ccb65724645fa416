//! Admission Module
//!
//! Score-and-threshold gate applied to payload bytes before a write lands.
//!
//! A rejected payload is a normal outcome (`write_atom` returns `Ok(false)`),
//! never an error. The filter is a trait so the engine can be opened with any
//! deterministic scoring policy; [`HarmonyFilter`] is the default.

/// Golden ratio
pub const PHI: f64 = 1.618_033_988_75;

/// Default admission threshold, `1 / PHI` (~0.618)
pub const HARMONY_THRESHOLD: f64 = 1.0 / PHI;

/// Highest score the harmony filter can produce
pub const MAX_HARMONY: f64 = 0.99;

/// Fixed-point scale used for the on-disk harmony_score field
pub const SCORE_SCALE: f64 = 10_000.0;

/// A deterministic admission policy over payload bytes
pub trait AdmissionFilter: Send + Sync {
    /// Score `payload`; must be in `[0, 1]` and depend only on the bytes
    fn score(&self, payload: &[u8]) -> f64;

    /// Minimum score that is admitted
    fn threshold(&self) -> f64;

    fn admits(&self, score: f64) -> bool {
        score >= self.threshold()
    }
}

/// Distinct-byte ratio scaled by PHI, capped at 0.99
#[derive(Debug, Clone, Copy, Default)]
pub struct HarmonyFilter;

impl AdmissionFilter for HarmonyFilter {
    fn score(&self, payload: &[u8]) -> f64 {
        if payload.is_empty() {
            return 0.0;
        }

        let mut seen = [false; 256];
        let mut distinct = 0usize;
        for &b in payload {
            if !seen[b as usize] {
                seen[b as usize] = true;
                distinct += 1;
            }
        }

        let ratio = distinct as f64 / payload.len() as f64;
        (ratio * PHI).min(MAX_HARMONY)
    }

    fn threshold(&self) -> f64 {
        HARMONY_THRESHOLD
    }
}

/// Admits everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl AdmissionFilter for AcceptAll {
    fn score(&self, _payload: &[u8]) -> f64 {
        MAX_HARMONY
    }

    fn threshold(&self) -> f64 {
        0.0
    }
}

/// Encode a `[0, 1]` score as `score × 10000`, truncated
pub fn encode_score(score: f64) -> u16 {
    (score.clamp(0.0, 1.0) * SCORE_SCALE) as u16
}

pub fn decode_score(raw: u16) -> f64 {
    raw as f64 / SCORE_SCALE
}
