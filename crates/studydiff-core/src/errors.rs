use studydiff_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using the canonical ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions and surfacing through the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    NotFound,
    DuplicateIdentity,

    // Diff invariants
    /// A diff fact names a field that does not belong to its related object,
    /// or carries a value of the wrong kind for the field
    InvariantViolation,

    // Integration/IO
    Persistence,
    Decode,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::DuplicateIdentity => "ERR_DUPLICATE_IDENTITY",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Decode => "ERR_DECODE",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional context
/// (operation, entity, study, correlation ids) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    study_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            study_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Add study ID context
    pub fn with_study_id(mut self, id: impl ToString) -> Self {
        self.study_id = Some(id.to_string());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn study_id(&self) -> Option<&str> {
        self.study_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(study_id) = &self.study_id {
            write!(f, " (study_id: {})", study_id)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised while computing a study changelog
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StudyDiffError {
    /// Study is not known to the snapshot source
    #[error("Study not found: {study_id}")]
    StudyNotFound { study_id: String },

    /// Study names a parent that the snapshot source cannot resolve
    #[error("Parent study {parent_study_id} of study {study_id} not found")]
    ParentStudyNotFound {
        study_id: String,
        parent_study_id: String,
    },

    /// Two snapshots on the same side of a diff copy the same domain object
    #[error("Duplicate {kind} identity {domain_id} on the {side} side")]
    DuplicateIdentity {
        kind: String,
        domain_id: String,
        side: String,
    },

    /// A FieldChanged fact names a field from another entity kind
    #[error("Field {field} does not belong to related object {related_object}")]
    FieldSubjectMismatch {
        field: String,
        related_object: String,
    },

    /// A FieldChanged fact carries a value of the wrong kind
    #[error("Field {field} expects {expected} values")]
    ValueKindMismatch { field: String, expected: String },
}

impl From<StudyDiffError> for ExError {
    fn from(err: StudyDiffError) -> Self {
        let message = err.to_string();
        match err {
            StudyDiffError::StudyNotFound { study_id } => ExError::new(ExErrorKind::NotFound)
                .with_study_id(study_id)
                .with_message(message),

            StudyDiffError::ParentStudyNotFound {
                study_id,
                parent_study_id,
            } => ExError::new(ExErrorKind::NotFound)
                .with_op("resolve_parent_study")
                .with_study_id(study_id)
                .with_entity_id(parent_study_id)
                .with_message(message),

            StudyDiffError::DuplicateIdentity { domain_id, .. } => {
                ExError::new(ExErrorKind::DuplicateIdentity)
                    .with_op("match_by_identity")
                    .with_entity_id(domain_id)
                    .with_message(message)
            }

            StudyDiffError::FieldSubjectMismatch { .. }
            | StudyDiffError::ValueKindMismatch { .. } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_op("emit_changelog")
                    .with_message(message)
            }
        }
    }
}
