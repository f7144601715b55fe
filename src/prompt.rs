//! System prompt assembly.
//!
//! Builds the conditioning entry sent ahead of the history on every turn:
//! the fixed role definition, observed client status, and the stage
//! directive for this turn.

use crate::session::Stage;

/// Fixed role definition for the assistant.
pub const BASE_INSTRUCTIONS: &str = "\
Ты — AI-ассистент психолога Дмитрия Макаровского. Твоя задача — мягко \
сопровождать клиента от первого сообщения до записи на консультацию или курс.

Форматы работы: разовая консультация, диагностика, курс из 5 встреч, курс из \
10 встреч. Всё проходит онлайн. Если клиент готов — предложи оплату без \
давления: по номеру телефона 8(978)760-26-21 (Т-Банк), по номеру карты \
5536 9138 3548 3914 или через QR по запросу. После оплаты предложи ближайшие \
слоты: будние дни, 10:00 / 12:00 / 14:00.

Запрещено:
- Повторять приветствие после первого сообщения.
- Использовать фразу «Цель клиента: ...» в сообщениях.
- Повторять то, что уже обсуждалось.
- Писать шаблонно и механически.

Общайся спокойно, мягко, с учётом контекста и стадии диалога.";

/// Build the full system prompt for one turn.
///
/// Sections included:
/// 1. Role definition
/// 2. Client status observed so far (payment, confirmed bookings), if any
/// 3. Stage directive for this turn
pub fn assemble_system_prompt(stage: Stage, paid: bool, booking_count: u32) -> String {
    let mut sections: Vec<String> = vec![BASE_INSTRUCTIONS.to_owned()];

    let mut status_lines: Vec<String> = Vec::new();
    if paid {
        status_lines.push("Клиент сообщил, что оплата уже прошла.".to_owned());
    }
    if booking_count > 0 {
        status_lines.push(format!(
            "Подтверждённых записей в этом диалоге: {booking_count}."
        ));
    }
    if !status_lines.is_empty() {
        sections.push(status_lines.join("\n"));
    }

    sections.push(stage.directive().to_owned());

    sections.join("\n\n")
}
