//! Workbench state for one lookup → edit → process cycle
//!
//! Each action is split into a `begin_*` step that checks and sets the
//! loading flag and a `finish_*` step that records the outcome. While the
//! flag is set every action is refused with [`ConsoleError::Busy`].

use crate::error::ConsoleError;
use incident_core::{FieldList, FieldValue, Incident, IncidentNumber};

/// What the result panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView<'a> {
    /// Lookup in flight with nothing loaded yet
    Processing,
    /// Last action failed
    Error(&'a str),
    /// Processing result
    Result(&'a str),
    /// Nothing to show
    Hidden,
}

/// Client-side incident workflow state
#[derive(Debug, Clone, Default)]
pub struct Workbench {
    fields: FieldList,
    incident_number: Option<IncidentNumber>,
    incident: Option<Incident>,
    form: Incident,
    combined_text: String,
    loading: bool,
    result: Option<String>,
    error: Option<String>,
}

impl Workbench {
    /// Workbench showing `fields`; empty means every field of the record
    #[must_use]
    pub fn new(fields: FieldList) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Start a lookup
    ///
    /// # Returns
    /// The key to fetch, or `None` if the input is blank
    ///
    /// # Errors
    /// `ConsoleError::Busy` while another action is in flight
    pub fn begin_lookup(&mut self, input: &str) -> Result<Option<IncidentNumber>, ConsoleError> {
        self.ensure_idle()?;
        let Ok(key) = IncidentNumber::new(input) else {
            return Ok(None);
        };

        self.loading = true;
        self.error = None;
        self.result = None;
        self.set_incident(None);
        self.incident_number = Some(key.clone());
        Ok(Some(key))
    }

    /// Record a lookup outcome
    pub fn finish_lookup(&mut self, outcome: Result<Incident, ConsoleError>) {
        self.loading = false;
        match outcome {
            Ok(incident) => self.set_incident(Some(incident)),
            Err(err) => self.fail(&err),
        }
    }

    /// Change a form value
    ///
    /// # Errors
    /// - `ConsoleError::Busy` while another action is in flight
    /// - `ConsoleError::NoIncident` before a successful lookup
    pub fn edit(&mut self, field: &str, value: impl Into<String>) -> Result<(), ConsoleError> {
        self.ensure_idle()?;
        if self.incident.is_none() {
            return Err(ConsoleError::NoIncident);
        }

        self.form.insert(field, FieldValue::Text(value.into()));
        self.recompute_combined_text();
        Ok(())
    }

    /// Start a save
    ///
    /// # Returns
    /// Key and form values to submit, or `None` if there is nothing to save
    ///
    /// # Errors
    /// `ConsoleError::Busy` while another action is in flight
    pub fn begin_save(&mut self) -> Result<Option<(IncidentNumber, Incident)>, ConsoleError> {
        self.ensure_idle()?;
        let Some(key) = self.incident_number.clone() else {
            return Ok(None);
        };
        if self.incident.is_none() || self.form.is_empty() {
            return Ok(None);
        }

        self.loading = true;
        self.error = None;
        Ok(Some((key, self.form.clone())))
    }

    /// Record a save outcome; the returned record replaces the form
    pub fn finish_save(&mut self, outcome: Result<Incident, ConsoleError>) {
        self.loading = false;
        match outcome {
            Ok(incident) => self.set_incident(Some(incident)),
            Err(err) => self.fail(&err),
        }
    }

    /// Start processing the combined text
    ///
    /// # Returns
    /// Text to process, or `None` if it is blank
    ///
    /// # Errors
    /// `ConsoleError::Busy` while another action is in flight
    pub fn begin_process(&mut self) -> Result<Option<String>, ConsoleError> {
        self.ensure_idle()?;
        if self.combined_text.trim().is_empty() {
            return Ok(None);
        }

        self.loading = true;
        self.error = None;
        self.result = None;
        Ok(Some(self.combined_text.clone()))
    }

    /// Record a processing outcome
    pub fn finish_process(&mut self, outcome: Result<String, ConsoleError>) {
        self.loading = false;
        match outcome {
            Ok(text) => self.result = Some(text),
            Err(err) => self.fail(&err),
        }
    }

    /// Fields shown and composed, in order
    #[must_use]
    pub fn display_fields(&self) -> Vec<String> {
        if self.fields.is_empty() {
            self.form.iter().map(|(name, _)| name.clone()).collect()
        } else {
            self.fields.iter().map(ToString::to_string).collect()
        }
    }

    /// Result panel state
    #[must_use]
    pub fn result_view(&self) -> ResultView<'_> {
        if self.loading && self.incident.is_none() {
            ResultView::Processing
        } else if let Some(error) = &self.error {
            ResultView::Error(error)
        } else if let Some(result) = &self.result {
            ResultView::Result(result)
        } else {
            ResultView::Hidden
        }
    }

    /// Looked-up incident number
    #[inline]
    #[must_use]
    pub fn incident_number(&self) -> Option<&IncidentNumber> {
        self.incident_number.as_ref()
    }

    /// Last loaded record
    #[inline]
    #[must_use]
    pub fn incident(&self) -> Option<&Incident> {
        self.incident.as_ref()
    }

    /// Current form value of a field
    #[must_use]
    pub fn form_value(&self, field: &str) -> Option<&FieldValue> {
        self.form.get(field)
    }

    /// `"<field>: <value>"` entries separated by blank lines
    #[inline]
    #[must_use]
    pub fn combined_text(&self) -> &str {
        &self.combined_text
    }

    /// Whether an action is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last processing result
    #[inline]
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Last error, prefixed with `Error: `
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn ensure_idle(&self) -> Result<(), ConsoleError> {
        if self.loading {
            Err(ConsoleError::Busy)
        } else {
            Ok(())
        }
    }

    fn fail(&mut self, err: &ConsoleError) {
        tracing::warn!("Action failed: {}", err);
        self.error = Some(format!("Error: {err}"));
    }

    fn set_incident(&mut self, incident: Option<Incident>) {
        self.form = incident.clone().unwrap_or_default();
        self.incident = incident;
        self.recompute_combined_text();
    }

    fn recompute_combined_text(&mut self) {
        if self.incident.is_none() {
            self.combined_text.clear();
            return;
        }

        self.combined_text = self
            .display_fields()
            .iter()
            .map(|field| {
                let value = self.form.get(field).map(ToString::to_string).unwrap_or_default();
                format!("{field}: {value}")
            })
            .collect::<Vec<_>>()
            .join("\n\n");
    }
}
