pub mod formatter;
pub mod labels;

pub use formatter::{
    format_json, format_municipality_detail, format_ranked_table, format_score, format_templates,
    format_tsv, should_use_colors,
};
pub use labels::Lang;
