/// Append-only cursor over the backend's cumulative message snapshots.
#[derive(Debug, Clone, Default)]
pub struct DeltaCursor {
    emitted: String,
}

impl DeltaCursor {
    /// Advance to `current`, returning the appended suffix when `current`
    /// extends the previously emitted text by prefix.
    ///
    /// Truncations and rewrites advance the cursor without emitting a
    /// delta; the terminal frame's final text is authoritative for those
    /// sessions, so no diff of the mutated portion is attempted.
    pub fn advance(&mut self, current: &str) -> Option<String> {
        if current.len() > self.emitted.len() && current.starts_with(self.emitted.as_str()) {
            let delta = current[self.emitted.len()..].to_string();
            self.emitted = current.to_string();
            return Some(delta);
        }

        if current != self.emitted {
            self.emitted = current.to_string();
        }
        None
    }

    /// Text covered by the deltas emitted so far.
    pub fn emitted(&self) -> &str {
        &self.emitted
    }
}
