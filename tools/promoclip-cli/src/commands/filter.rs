//! Print the compiled filter-graph expression.

use promoclip_model::filter::compile_filter;
use promoclip_model::spec::OverlaySpec;

pub fn run(
    primary: Option<String>,
    promo: Option<String>,
    description: Option<String>,
) -> anyhow::Result<()> {
    let mut spec = OverlaySpec::default();
    if let Some(text) = primary {
        spec.primary = text;
    }
    if let Some(text) = promo {
        spec.promo = text;
    }
    if let Some(text) = description {
        spec.description = text;
    }

    println!("{}", compile_filter(&spec));
    Ok(())
}
