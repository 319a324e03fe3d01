//! Prompt construction for feedback classification.
//!
//! Prompts embed the active category catalog (ids, descriptions, keywords)
//! and the literal feedback texts, and pin the expected reply shape to a
//! strict JSON contract that the client validates.

use triage_core::CategoryRegistry;

/// Render the active category catalog as a prompt block.
fn category_block(registry: &CategoryRegistry) -> String {
    let mut block = String::new();
    for category in registry.active() {
        block.push_str("- ");
        block.push_str(&category.id);
        block.push_str(": ");
        block.push_str(&category.description);
        if !category.keywords.is_empty() {
            block.push_str(" (keywords: ");
            block.push_str(&category.keywords.join(", "));
            block.push(')');
        }
        block.push('\n');
    }
    block
}

/// Build the prompt for a single-item classification call.
pub fn single_prompt(text: &str, registry: &CategoryRegistry) -> String {
    format!(
        "You are a customer feedback classifier. Assign the feedback below to \
         exactly one of these categories:\n\n{categories}\n\
         Feedback:\n\"{text}\"\n\n\
         Respond with ONLY a JSON object, no other text:\n\
         {{\"category\": \"<category id>\", \"confidence\": <0.0-1.0>, \
         \"reasoning\": \"<one sentence>\", \"keyIndicators\": [\"<phrase>\", ...]}}",
        categories = category_block(registry),
        text = text,
    )
}

/// Build the prompt for a batched classification call.
///
/// Items are enumerated with 1-based indices; the reply contract requires a
/// JSON array with exactly one object per item carrying its index back.
pub fn batch_prompt(texts: &[String], registry: &CategoryRegistry) -> String {
    let mut items = String::new();
    for (i, text) in texts.iter().enumerate() {
        items.push_str(&format!("{}. \"{}\"\n", i + 1, text));
    }

    format!(
        "You are a customer feedback classifier. Assign each feedback item \
         below to exactly one of these categories:\n\n{categories}\n\
         Feedback items:\n{items}\n\
         Respond with ONLY a JSON array containing exactly {count} objects, \
         one per item, no other text:\n\
         [{{\"index\": <item number>, \"category\": \"<category id>\", \
         \"confidence\": <0.0-1.0>, \"reasoning\": \"<one sentence>\", \
         \"keyIndicators\": [\"<phrase>\", ...]}}]",
        categories = category_block(registry),
        items = items,
        count = texts.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::Category;

    fn registry() -> CategoryRegistry {
        CategoryRegistry::new(vec![
            Category::new(
                "bug_report",
                "Bug Report",
                "Crashes, errors, broken functionality",
                vec!["crash".into(), "error".into()],
            ),
            Category {
                active: false,
                ..Category::new("retired", "Retired", "No longer used", vec![])
            },
            Category::new("general_inquiry", "General Inquiry", "Everything else", vec![]),
        ])
        .unwrap()
    }

    #[test]
    fn single_prompt_embeds_categories_and_text() {
        let prompt = single_prompt("The app crashed on login", &registry());
        assert!(prompt.contains("bug_report: Crashes, errors, broken functionality"));
        assert!(prompt.contains("(keywords: crash, error)"));
        assert!(prompt.contains("\"The app crashed on login\""));
        assert!(prompt.contains("keyIndicators"));
    }

    #[test]
    fn single_prompt_omits_inactive_categories() {
        let prompt = single_prompt("text", &registry());
        assert!(!prompt.contains("retired"));
    }

    #[test]
    fn batch_prompt_enumerates_one_based() {
        let texts = vec!["first item".to_string(), "second item".to_string()];
        let prompt = batch_prompt(&texts, &registry());
        assert!(prompt.contains("1. \"first item\""));
        assert!(prompt.contains("2. \"second item\""));
        assert!(prompt.contains("exactly 2 objects"));
    }

    #[test]
    fn category_without_keywords_has_no_keyword_clause() {
        let prompt = single_prompt("text", &registry());
        assert!(prompt.contains("general_inquiry: Everything else\n"));
    }
}
