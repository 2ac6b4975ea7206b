//! Prompt construction for persona replies.
//!
//! The system message carries the voice of the persona; the user message
//! carries the group context, the recent conversation and the message to
//! answer, each wrapped in a pseudo-XML block.

use chat_core::{CompletionRequest, ContextEntry};

/// Placeholder shown for image-only messages.
pub const IMAGE_PLACEHOLDER: &str = "[Foto]";

const BASE_INSTRUCTION: &str = "\
Sei un signore di 65+ anni che scrive nei gruppi di Signal dal laptop. \
Personalità: \
- Scrivi SEMPRE e SOLO in italiano, tutto minuscolo (come se non sapessi usare le maiuscole) \
- NON usare MAI emoticon o emoji \
- Sei confuso dalla tecnologia ma sempre positivo e desideroso di aiuto \
- Fai confusione tra concetti informatici (confondere app con siti, wifi con internet, etc.) \
- Usa metafore della vita quotidiana per spiegare cose tecniche \
- Chiedi spiegazioni quando non capisci qualcosa \
- Sei gentile, curioso e un po' ingenuo con la tecnologia \
- Rispondi in modo naturale alla conversazione \
- Non fare mai commenti meta sul tuo ruolo o personalità ";

const IMAGE_GUIDANCE: &str = "\
IMPORTANTE: Il messaggio contiene un'immagine. Guardala e commentala con la tua personalità: \
- Descrivi quello che vedi in modo semplice e un po' confuso \
- Fai domande ingenue sull'immagine \
- Usa confronti con cose che conosci della vita quotidiana \
- Se è una foto di cibo, famiglia, paesaggi, etc. commenta in modo genuino \
- Se è qualcosa di tecnologico, mostra confusione ma curiosità \
Esempi: \
- 'oh che bella foto! ma come hai fatto a farla così nitida? il mio telefono le fa sempre mosse' \
- 'questo piatto sembra buonissimo, è come quello che faceva mia moglie' \
- 'non capisco questa cosa sullo schermo, è un programma nuovo?' ";

const STYLE_EXAMPLES: &str = "\
Esempi di stile: \
- 'scusa ma questo whatsapp funziona come la radio? devo premere qualcosa?' \
- 'ho provato a mandare la foto ma è finita nel computer, come faccio a metterla nel telefono?' \
- 'mia nipote mi ha detto di scaricare un app ma non so dove metterla, è come i programmi della tv?' ";

const ANSWER_ONLY: &str = "Rispondi solo con il tuo messaggio, senza spiegazioni.";

/// Note appended to the new message when it carries an image.
const IMAGE_NOTE: &str = "(Il messaggio contiene un'immagine)";

/// System message for a reply, with image guidance when an image is attached.
pub fn system_instruction(has_image: bool) -> String {
    let extra = if has_image { IMAGE_GUIDANCE } else { STYLE_EXAMPLES };
    format!("{}{}{}", BASE_INSTRUCTION, extra, ANSWER_ONLY)
}

/// Render the user message for a completion request.
pub fn format_conversation(request: &CompletionRequest) -> String {
    let mut lines = vec![
        "<context>".to_string(),
        format!("Group: {}", request.group_name),
        format!("Your personality: {}", request.persona),
        "</context>\n".to_string(),
        "<conversation>".to_string(),
    ];

    lines.extend(request.history().iter().map(format_entry));
    lines.push("</conversation>\n".to_string());

    lines.push("<new_message>".to_string());
    if let Some(latest) = request.latest() {
        lines.push(format_entry(latest));
        if latest.has_image || request.image.is_some() {
            lines.push(IMAGE_NOTE.to_string());
        }
    }
    lines.push("</new_message>".to_string());

    lines.join("\n")
}

fn format_entry(entry: &ContextEntry) -> String {
    let text = if entry.text.trim().is_empty() && entry.has_image {
        IMAGE_PLACEHOLDER
    } else {
        entry.text.as_str()
    };

    match &entry.reply_to {
        Some(reply) if reply.to_self => {
            format!("{} (replying to you): {}", entry.sender_name, text)
        }
        Some(reply) => {
            let target = reply
                .author_name
                .as_deref()
                .unwrap_or(reply.message.author.as_str());
            format!("{} (replying to {}): {}", entry.sender_name, target, text)
        }
        None => format!("{}: {}", entry.sender_name, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{ChatEvent, ImageRef, MessageRef, ReplyRef};

    fn request(context: Vec<ContextEntry>) -> CompletionRequest {
        CompletionRequest {
            persona: "un nonno gentile".to_string(),
            group_name: "Famiglia".to_string(),
            context,
            image: None,
        }
    }

    fn entry(sender: &str, text: &str, id: u64) -> ContextEntry {
        ContextEntry::from_event(&ChatEvent::new("g", sender, text, id).with_sender_name(sender))
    }

    #[test]
    fn test_conversation_layout() {
        let prompt = format_conversation(&request(vec![
            entry("Giulia", "chi viene domenica?", 1),
            entry("Marco", "io ci sono", 2),
            entry("Anna", "nonno tu vieni?", 3),
        ]));

        let expected = "<context>\n\
                        Group: Famiglia\n\
                        Your personality: un nonno gentile\n\
                        </context>\n\n\
                        <conversation>\n\
                        Giulia: chi viene domenica?\n\
                        Marco: io ci sono\n\
                        </conversation>\n\n\
                        <new_message>\n\
                        Anna: nonno tu vieni?\n\
                        </new_message>";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_replies_are_annotated() {
        let to_marco = ReplyRef {
            message: MessageRef::new(2, "+15552222222"),
            author_name: Some("Marco".to_string()),
            text: None,
            to_self: false,
        };
        let to_self = ReplyRef {
            message: MessageRef::new(3, "+15550000000"),
            author_name: None,
            text: Some("eh".to_string()),
            to_self: true,
        };

        let first = ContextEntry::from_event(
            &ChatEvent::new("g", "a", "davvero?", 4)
                .with_sender_name("Giulia")
                .with_reply(to_marco),
        );
        let second = ContextEntry::from_event(
            &ChatEvent::new("g", "b", "grazie nonno", 5)
                .with_sender_name("Anna")
                .with_reply(to_self),
        );

        let prompt = format_conversation(&request(vec![first, second]));
        assert!(prompt.contains("Giulia (replying to Marco): davvero?"));
        assert!(prompt.contains("Anna (replying to you): grazie nonno"));
    }

    #[test]
    fn test_image_only_message() {
        let event = ChatEvent::new("g", "a", "", 1)
            .with_sender_name("Giulia")
            .with_image(ImageRef {
                attachment_id: "att".to_string(),
                content_type: "image/jpeg".to_string(),
            });
        let prompt = format_conversation(&request(vec![ContextEntry::from_event(&event)]));

        assert!(prompt.contains("Giulia: [Foto]"));
        assert!(prompt.contains("(Il messaggio contiene un'immagine)"));
    }

    #[test]
    fn test_system_instruction_variants() {
        let plain = system_instruction(false);
        let with_image = system_instruction(true);

        assert!(plain.contains("tutto minuscolo"));
        assert!(plain.contains("Esempi di stile"));
        assert!(!plain.contains("IMPORTANTE"));
        assert!(with_image.contains("IMPORTANTE"));
        assert!(with_image.ends_with(ANSWER_ONLY));
    }
}
