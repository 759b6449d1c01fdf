use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Bool,
    Int,
}

impl ScalarKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Bool => "boolean",
            ScalarKind::Int => "integer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    Scalar(ScalarKind),
    /// Ordered list of nested blocks.
    List(Block),
    /// Unordered set of unique scalars.
    Set(ScalarKind),
}

/// One field of a resource schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    kind: AttributeKind,
    required: bool,
    optional: bool,
    computed: bool,
    sensitive: bool,
    default: Option<Value>,
    max_items: Option<usize>,
    one_of: Vec<&'static str>,
    description: Option<&'static str>,
}

impl Attribute {
    fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            default: None,
            max_items: None,
            one_of: Vec::new(),
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(AttributeKind::Scalar(ScalarKind::String))
    }

    pub fn bool() -> Self {
        Self::new(AttributeKind::Scalar(ScalarKind::Bool))
    }

    pub fn int() -> Self {
        Self::new(AttributeKind::Scalar(ScalarKind::Int))
    }

    pub fn list(block: Block) -> Self {
        Self::new(AttributeKind::List(block))
    }

    pub fn set(element: ScalarKind) -> Self {
        Self::new(AttributeKind::Set(element))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Restrict string values (or set elements) to a fixed list.
    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.one_of = values.to_vec();
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Set only by the remote service, never by configuration.
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn max_item_count(&self) -> Option<usize> {
        self.max_items
    }

    pub fn allowed_values(&self) -> &[&'static str] {
        &self.one_of
    }

    pub fn description(&self) -> Option<&'static str> {
        self.description
    }
}

/// Ordered collection of named attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    attributes: Vec<(&'static str, Attribute)>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.push((name, attribute));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes
            .iter()
            .map(|(name, attribute)| (*name, attribute))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    pub description: &'static str,
    pub block: Block,
}

impl ResourceSchema {
    pub fn new(type_name: &'static str, description: &'static str, block: Block) -> Self {
        Self {
            type_name,
            description,
            block,
        }
    }
}
