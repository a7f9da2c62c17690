use anyhow::{anyhow, Result};

use crate::catalog::{Catalog, CheckPhase, FacilityType, FocusArea};

pub fn run(category: Option<String>) -> Result<()> {
    print!("{}", render(category.as_deref())?);
    Ok(())
}

/// Either one category in detail or an overview of categories and labels.
pub fn render(category: Option<&str>) -> Result<String> {
    let catalog = Catalog::global();
    let rule = "=".repeat(60);
    let mut out = String::new();

    if let Some(id) = category {
        let template = catalog.template(id).ok_or_else(|| {
            anyhow!(
                "Unknown category: {} (available: {})",
                id,
                catalog.category_ids().join(", ")
            )
        })?;
        let info = &template.info;
        out.push_str(&format!(
            "\n{} {}\n{}\n{}\n\n",
            info.icon, info.name, rule, info.description
        ));
        out.push_str(&format!("Questions ({}):\n", template.questions.len()));
        for (i, q) in template.questions.iter().enumerate() {
            out.push_str(&format!("\n{}. {} {}\n", i + 1, q.prompt, q.importance.glyph()));
            out.push_str(&format!("   Type: {}\n", q.answer.as_str()));
            out.push_str(&format!("   Required: {}\n", if q.required { "yes" } else { "no" }));
            if !q.answer.options().is_empty() {
                out.push_str(&format!("   Options: {}\n", q.answer.options().join(", ")));
            }
        }
        return Ok(out);
    }

    out.push_str(&format!("\n📋 Available categories\n{}\n", rule));
    for template in catalog.templates() {
        let info = &template.info;
        out.push_str(&format!("{} {} ({})\n", info.icon, info.name, info.id));
        out.push_str(&format!("   {}\n", info.description));
        out.push_str(&format!("   Questions: {}\n\n", template.questions.len()));
    }

    out.push_str(&format!("\n📌 Facility types\n{}\n", rule));
    for f in FacilityType::ALL {
        out.push_str(&format!("  - {}\n", f.label()));
    }
    out.push_str(&format!("\n📌 Inspection phases\n{}\n", rule));
    for p in CheckPhase::ALL {
        out.push_str(&format!("  - {}\n", p.label()));
    }
    out.push_str(&format!("\n📌 Focus areas\n{}\n", rule));
    for f in FocusArea::ALL {
        out.push_str(&format!("  - {}\n", f.label()));
    }
    out.push('\n');
    Ok(out)
}
