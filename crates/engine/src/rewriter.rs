//! Conversation rewriter — folds a tool turn back into the transcript.
//!
//! After a batch of tool calls executes, three messages are appended so the
//! next model call sees the full exchange: the assistant's tool-use claim,
//! the paired results, and an instruction to cite the sources it used. The
//! rewrite is strictly additive; earlier messages are never touched.

use crate::accumulator::FinalizedToolCall;
use tern_core::message::{ContentBlock, Message};
use tern_core::tool::ToolOutcome;

/// Appended after every tool turn so answers attribute their sources.
pub const CITATION_INSTRUCTION: &str = "Based on the search results and page \
content above, answer my original question. Cite the URLs of the sources you \
actually used, and do not invent sources that were not returned.";

/// Append the tool turn to the conversation.
///
/// `calls` and `outcomes` are paired by call id; every call gets exactly one
/// result block, in call order, whether the adapter succeeded or failed.
pub fn rewrite(
    conversation: &mut Vec<Message>,
    calls: &[FinalizedToolCall],
    outcomes: &[ToolOutcome],
) {
    let use_blocks: Vec<ContentBlock> = calls
        .iter()
        .map(|call| ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.args.clone(),
        })
        .collect();

    let result_blocks: Vec<ContentBlock> = calls
        .iter()
        .map(|call| {
            let payload = outcomes
                .iter()
                .find(|o| o.tool_call_id == call.id)
                .map(|o| o.payload.clone())
                .unwrap_or_default();
            ContentBlock::ToolResult {
                tool_use_id: call.id.clone(),
                content: payload,
            }
        })
        .collect();

    conversation.push(Message::tool_use(use_blocks));
    conversation.push(Message::tool_results(result_blocks));
    conversation.push(Message::user(CITATION_INSTRUCTION));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::message::{MessageContent, Role};

    fn call(id: &str, name: &str) -> FinalizedToolCall {
        FinalizedToolCall {
            id: id.into(),
            name: name.into(),
            args: serde_json::json!({"query": "cats"}),
        }
    }

    fn outcome(id: &str, payload: &str) -> ToolOutcome {
        ToolOutcome {
            tool_call_id: id.into(),
            payload: payload.into(),
        }
    }

    #[test]
    fn appends_three_messages() {
        let mut conversation = vec![Message::user("find cats")];
        rewrite(
            &mut conversation,
            &[call("toolu_01", "search")],
            &[outcome("toolu_01", "[]")],
        );
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation[0], Message::user("find cats"));
        assert_eq!(conversation[1].role, Role::Assistant);
        assert_eq!(conversation[2].role, Role::User);
        assert_eq!(
            conversation[3],
            Message::user(CITATION_INSTRUCTION)
        );
    }

    #[test]
    fn results_pair_by_call_id_in_call_order() {
        let mut conversation = Vec::new();
        rewrite(
            &mut conversation,
            &[call("a", "search"), call("b", "browse")],
            // outcomes arrive in completion order, not call order
            &[outcome("b", "page"), outcome("a", "hits")],
        );

        let MessageContent::Blocks(results) = &conversation[1].content else {
            panic!("expected block content");
        };
        assert_eq!(
            results[0],
            ContentBlock::ToolResult {
                tool_use_id: "a".into(),
                content: "hits".into()
            }
        );
        assert_eq!(
            results[1],
            ContentBlock::ToolResult {
                tool_use_id: "b".into(),
                content: "page".into()
            }
        );
    }

    #[test]
    fn tool_use_blocks_carry_the_parsed_arguments() {
        let mut conversation = Vec::new();
        rewrite(
            &mut conversation,
            &[call("toolu_01", "search")],
            &[outcome("toolu_01", "[]")],
        );
        let MessageContent::Blocks(uses) = &conversation[0].content else {
            panic!("expected block content");
        };
        assert_eq!(
            uses[0],
            ContentBlock::ToolUse {
                id: "toolu_01".into(),
                name: "search".into(),
                input: serde_json::json!({"query": "cats"}),
            }
        );
    }
}
