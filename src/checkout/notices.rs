use crate::domain::{format_amount, Order, PaymentData, Ticket, UserId};
use crate::platform::{Notice, Tone};

pub fn ticket_opened(ticket: &Ticket) -> Notice {
    Notice::new(format!("Pedido #{}", ticket.code), Tone::Info)
        .field("Cliente", format!("<@{}>", ticket.buyer))
        .field("Produto", &ticket.product.name)
        .field("Quantidade", ticket.quantity)
        .field("Preço unitário", format_amount(ticket.product.unit_price))
        .field("Total", format_amount(ticket.total))
        .line("Escolha a forma de pagamento: Pix Copia e Cola ou QR Code Pix.")
        .image(ticket.product.image_url.clone())
}

pub fn admin_panel(ticket: &Ticket) -> Notice {
    Notice::new("Painel do administrador", Tone::Warning)
        .field("Ticket", &ticket.code)
        .line("Aprovar, rejeitar ou fechar este ticket.")
}

pub fn payment_instructions(order: &Order) -> Notice {
    let notice = Notice::new(order.method.label(), Tone::Success)
        .field("Ticket ID", &order.ticket_code)
        .field("Valor", format_amount(order.total));
    match &order.payment_data {
        PaymentData::Key(key) => notice
            .field("Chave Pix", key)
            .field("Beneficiário", "Loja do Servidor")
            .line("Após o pagamento, aguarde a aprovação."),
        PaymentData::QrPayload(payload) => notice
            .line("Escaneie o QR Code com seu aplicativo bancário.")
            .field("Código", payload),
    }
}

pub fn approved_for_buyer(ticket: &Ticket, delivery_link: &str) -> Notice {
    Notice::new("Pagamento Aprovado!", Tone::Success)
        .line(format!("Seu pedido #{} foi aprovado!", ticket.code))
        .field("Produto", &ticket.product.name)
        .field("Quantidade", ticket.quantity)
        .field("Total pago", format_amount(ticket.total))
        .field("Link de entrega", delivery_link)
        .image(ticket.product.image_url.clone())
}

pub fn approved_in_channel(ticket: &Ticket, admin: UserId) -> Notice {
    Notice::new("Pagamento Aprovado", Tone::Success)
        .line(format!("Pagamento aprovado por <@{admin}>"))
        .field("Ticket ID", &ticket.code)
        .field("Total", format_amount(ticket.total))
        .line("O canal será fechado automaticamente em breve.")
}

/// Audit entry for a completed sale, with the stock left after the debit.
pub fn sale_logged(ticket: &Ticket, order: &Order, admin: UserId, remaining: u32) -> Notice {
    Notice::new(format!("Nova venda #{}", ticket.code), Tone::Info)
        .field("Cliente", format!("<@{}>", ticket.buyer))
        .field("Produto", &ticket.product.name)
        .field("Categoria", &ticket.product.category_name)
        .field("Quantidade", ticket.quantity)
        .field("Total", format_amount(order.total))
        .field("Método", order.method.label())
        .field("Aprovado por", format!("<@{admin}>"))
        .field("Estoque restante", remaining)
}

pub fn rejected_for_buyer(ticket: &Ticket, reason: &str) -> Notice {
    Notice::new("Pedido Rejeitado", Tone::Danger)
        .line(format!("Seu pedido #{} foi rejeitado.", ticket.code))
        .field("Motivo", reason)
        .line("Caso acredite que houve um engano, entre em contato conosco.")
}

pub fn rejected_in_channel(admin: UserId, reason: &str) -> Notice {
    Notice::new("Pagamento Rejeitado", Tone::Danger)
        .line(format!("Pagamento rejeitado por <@{admin}>"))
        .field("Motivo", reason)
        .line("O canal será fechado automaticamente em breve.")
}

pub fn rejection_logged(ticket: &Ticket, admin: UserId, reason: &str) -> Notice {
    Notice::new(format!("Pedido rejeitado #{}", ticket.code), Tone::Danger)
        .field("Cliente", format!("<@{}>", ticket.buyer))
        .field("Produto", &ticket.product.name)
        .field("Rejeitado por", format!("<@{admin}>"))
        .field("Motivo", reason)
}

pub fn closed_logged(ticket: &Ticket, admin: UserId) -> Notice {
    Notice::new(format!("Ticket fechado #{}", ticket.code), Tone::Warning)
        .field("Cliente", format!("<@{}>", ticket.buyer))
        .field("Fechado por", format!("<@{admin}>"))
}
