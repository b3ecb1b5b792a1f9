//! Builder method macros for reducing code duplication.
//!
//! The fluent constructors share a handful of clause methods. These macros
//! generate them once per builder type while keeping each builder's own
//! surface readable in `builder.rs`.

/// Generate `logs` and `statement` for builders wrapping a `Draft`.
macro_rules! impl_draft_common {
    ($($builder:ident),+ $(,)?) => {
        $(
            impl<'c> $builder<'c> {
                /// Enable or disable statement logging for this statement.
                pub fn logs(mut self, enabled: bool) -> Self {
                    self.draft.log = enabled;
                    self
                }

                /// The clauses accumulated so far.
                pub fn statement(&self) -> &$crate::db::statement::Statement {
                    &self.draft.statement
                }
            }
        )+
    };
}

/// Generate `and_where` for builders whose statement takes a where clause.
///
/// Calling it more than once joins the fragments with `AND`.
macro_rules! impl_where_clause {
    ($($builder:ident),+ $(,)?) => {
        $(
            impl<'c> $builder<'c> {
                /// Add a where fragment. `?` placeholders in `template` are
                /// replaced by the escaped `args`, `??` by escaped identifiers.
                pub fn and_where(
                    mut self,
                    template: impl Into<String>,
                    args: impl $crate::models::IntoArgs,
                ) -> Self {
                    self.draft.statement.push_where(template, args.into_args());
                    self
                }
            }
        )+
    };
}

pub(crate) use impl_draft_common;
pub(crate) use impl_where_clause;
