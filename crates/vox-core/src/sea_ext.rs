use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, Select,
    sea_query::{Expr, Func},
};

/// Case-insensitive substring filter over one or more text columns.
pub trait ContainsIgnoreCase {
    /// Keeps rows where any of `columns` contains `needle`, ignoring case.
    fn contains_ignore_case<C>(self, columns: &[C], needle: &str) -> Self
    where
        C: ColumnTrait;
}

impl<E> ContainsIgnoreCase for Select<E>
where
    E: EntityTrait,
{
    fn contains_ignore_case<C>(self, columns: &[C], needle: &str) -> Self
    where
        C: ColumnTrait,
    {
        let pattern = like_pattern(needle);
        let condition = columns.iter().fold(Condition::any(), |cond, col| {
            cond.add(Expr::expr(Func::lower(Expr::col(*col))).like(pattern.clone()))
        });
        self.filter(condition)
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped and the text lowercased.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
