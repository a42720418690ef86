//! Status labels shared by tasks and subtasks.
//!
//! The set is configuration, not business logic: it comes from
//! `[tasks] statuses` and falls back to [`configs::DEFAULT_STATUSES`].

use serde::Serialize;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusSet(Vec<String>);

impl StatusSet {
    pub fn new<I, S>(labels: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into().trim().to_string();
            if label.is_empty() {
                return Err(ModelError::Validation("status label must not be empty".into()));
            }
            if !out.contains(&label) {
                out.push(label);
            }
        }
        if out.is_empty() {
            return Err(ModelError::Validation("at least one status is required".into()));
        }
        Ok(Self(out))
    }

    pub fn labels(&self) -> &[String] { &self.0 }

    pub fn contains(&self, status: &str) -> bool {
        self.0.iter().any(|s| s == status)
    }

    /// Status given to rows created without an explicit choice.
    pub fn initial(&self) -> &str { &self.0[0] }

    /// Check `status` is one of the configured labels and return it trimmed.
    pub fn validate(&self, status: &str) -> Result<String, ModelError> {
        let status = status.trim();
        if self.contains(status) {
            Ok(status.to_string())
        } else {
            Err(ModelError::Validation(format!(
                "status `{status}` is not one of: {}",
                self.0.join(", ")
            )))
        }
    }
}

impl Default for StatusSet {
    fn default() -> Self {
        Self(configs::DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect())
    }
}

impl TryFrom<&configs::TaskSettings> for StatusSet {
    type Error = ModelError;

    fn try_from(cfg: &configs::TaskSettings) -> Result<Self, Self::Error> {
        Self::new(cfg.statuses.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keeps_configured_order() {
        let set = StatusSet::default();
        assert_eq!(set.labels(), ["Pending", "In Progress", "Completed", "Cancelled"]);
        assert_eq!(set.initial(), "Pending");
    }

    #[test]
    fn validate_is_exact_after_trim() {
        let set = StatusSet::default();
        assert_eq!(set.validate(" In Progress ").unwrap(), "In Progress");
        assert!(set.validate("in progress").is_err());
        assert!(set.validate("Archived").is_err());
    }

    #[test]
    fn new_dedups_and_rejects_empty() {
        let set = StatusSet::new(["Open", "Open", "Closed"]).unwrap();
        assert_eq!(set.labels().len(), 2);
        assert!(StatusSet::new(Vec::<String>::new()).is_err());
        assert!(StatusSet::new(["Open", " "]).is_err());
    }
}
