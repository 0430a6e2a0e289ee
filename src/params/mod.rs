//! Query parameter serialization
//!
//! Converts named values into URL query fragments through an extensible,
//! ordered rule table.
//!
//! # Default rules
//!
//! | Order | Matches | Output |
//! |---|---|---|
//! | 1 | `String` | `name=<escaped>` |
//! | 2 | `Sequence` | `name[]=<item>&name[]=<item>...` (recursive) |
//! | 3 | `DateTime` | `name=YYYY-MM-DD` |
//! | 4 | `Named` string-like types | `name=<escaped>` |
//! | 5 | `Integer`, `Float` | `name=<decimal>` |
//! | 6 | `Bool` | `name=true` / `name=false` |

mod serializer;
mod types;

pub use serializer::{
    default_rules, query_escape, FragmentEncoder, KindPredicate, ParameterRule,
    ParameterSerializer,
};
pub use types::{ParamKind, ParamValue};

/// Named parameters for a request
pub type Params = std::collections::BTreeMap<String, ParamValue>;
