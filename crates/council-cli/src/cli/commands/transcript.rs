//! Plain-text rendering of conversations.

use std::fmt::Write;

use council_core::conversation::{AssistantMessage, Conversation, Message, RankingMetadata};

pub fn format_conversation(conversation: &Conversation) -> String {
    let mut out = String::new();
    let title = conversation.title.as_deref().unwrap_or("New Conversation");
    let _ = writeln!(out, "# {title} ({})", conversation.id);
    if let Some(models) = &conversation.council_models {
        let _ = writeln!(out, "council: {}", models.join(", "));
    }
    if let Some(chairman) = &conversation.chairman_model {
        let _ = writeln!(out, "chairman: {chairman}");
    }
    for message in &conversation.messages {
        out.push('\n');
        match message {
            Message::User { content } => {
                for line in content.lines() {
                    let _ = writeln!(out, "> {line}");
                }
            }
            Message::Assistant(message) => out.push_str(&format_assistant(message)),
        }
    }
    out
}

pub fn format_assistant(message: &AssistantMessage) -> String {
    let mut out = String::new();

    if let Some(stage1) = &message.stage1 {
        out.push_str("== Stage 1: individual answers ==\n");
        for response in stage1 {
            let _ = writeln!(out, "[{}]", response.model);
            push_indented(&mut out, &response.response);
        }
    }

    if let Some(stage2) = &message.stage2 {
        out.push_str("== Stage 2: peer rankings ==\n");
        for ranking in stage2 {
            let order: Vec<String> = ranking
                .parsed_ranking
                .iter()
                .map(|label| deanonymize(label, message.metadata.as_ref()))
                .collect();
            let _ = writeln!(out, "[{}] {}", ranking.model, order.join(" > "));
        }
        if let Some(metadata) = &message.metadata
            && !metadata.aggregate_rankings.is_empty()
        {
            out.push_str("aggregate:\n");
            for (position, aggregate) in metadata.aggregate_rankings.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {}. {} (avg {:.2}, {} votes)",
                    position + 1,
                    aggregate.model,
                    aggregate.average_rank,
                    aggregate.rankings_count
                );
            }
        }
    }

    if let Some(stage3) = &message.stage3 {
        let _ = writeln!(out, "== Stage 3: chairman ({}) ==", stage3.model);
        push_indented(&mut out, &stage3.response);
    }

    if let Some(stage) = message.paused {
        let _ = writeln!(out, "(paused after {stage})");
    }
    out
}

/// Maps an anonymized label such as `Response A` back to its model.
fn deanonymize(label: &str, metadata: Option<&RankingMetadata>) -> String {
    metadata
        .and_then(|m| m.label_to_model.get(label))
        .map_or_else(|| label.to_string(), Clone::clone)
}

fn push_indented(out: &mut String, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "  {line}");
    }
}
