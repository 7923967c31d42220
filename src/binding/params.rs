//! Per-route parameter descriptors, declared at registration time.

/// Semantic type of a body-bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Text,
    Integer,
    Float,
    Boolean,
    /// Any JSON value, passed through untouched.
    Json,
}

/// What a parameter receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// The current request.
    Request,
    /// The mutable default response.
    Response,
    /// A top-level key of the JSON body.
    Value(ParamType),
}

/// A declared handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    kind: ParamKind,
    required: bool,
}

impl Param {
    fn with_kind(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn request(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::Request)
    }

    pub fn response(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::Response)
    }

    pub fn value(name: impl Into<String>, ty: ParamType) -> Self {
        Self::with_kind(name, ParamKind::Value(ty))
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::value(name, ParamType::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::value(name, ParamType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::value(name, ParamType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::value(name, ParamType::Boolean)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::value(name, ParamType::Json)
    }

    /// Missing values bind as `null` instead of failing.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}
