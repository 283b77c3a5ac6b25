use serde::{Deserialize, Serialize};

/// Category of a symbol inside an expression, used by token mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Terminal,
}

/// The closed set of symbols expressions are built from.
///
/// Binary `operators` are declared so that a vocabulary file can describe them, but
/// nothing in generation, crossover or mutation composes with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Unary function names, e.g. `sin`
    pub functions: Vec<String>,
    /// The designated input variable every valid expression must reference
    pub variable: String,
    /// Named parameters, also used as the keys of a candidate's `params`
    pub parameters: Vec<String>,
    /// Binary operators, declared only
    pub operators: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            functions: ["sin", "cos", "tanh", "exp", "log", "abs"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            variable: "x".to_string(),
            parameters: ["a", "b", "c"].iter().map(|s| s.to_string()).collect(),
            operators: ["+", "-", "*", "/"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Vocabulary {
    /// Variable followed by parameters, the pool terminals are drawn from.
    pub fn terminals(&self) -> Vec<&str> {
        std::iter::once(self.variable.as_str())
            .chain(self.parameters.iter().map(String::as_str))
            .collect()
    }

    /// Classifies a symbol, or `None` when it is not part of this vocabulary.
    pub fn kind_of(&self, symbol: &str) -> Option<SymbolKind> {
        if self.functions.iter().any(|f| f == symbol) {
            Some(SymbolKind::Function)
        } else if symbol == self.variable || self.parameters.iter().any(|p| p == symbol) {
            Some(SymbolKind::Terminal)
        } else {
            None
        }
    }

    /// Every member of `kind` except `symbol` itself.
    pub fn alternatives(&self, kind: SymbolKind, symbol: &str) -> Vec<&str> {
        match kind {
            SymbolKind::Function => self
                .functions
                .iter()
                .map(String::as_str)
                .filter(|f| *f != symbol)
                .collect(),
            SymbolKind::Terminal => self
                .terminals()
                .into_iter()
                .filter(|t| *t != symbol)
                .collect(),
        }
    }
}
