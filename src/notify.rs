//! Outbound notifications: order emails and lifecycle events.
//!
//! Delivery is fire-and-forget. A failed send is logged and never surfaces
//! to the request that triggered it.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::models::{Order, OrderItem, User};

/// External email dispatcher seam. The SMTP transport is owned by another
/// service; the default implementation just records the outbound mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutboundEmail) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutboundEmail) -> anyhow::Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "outbound email");
        Ok(())
    }
}

/// Spawns the send so the caller never waits on it.
pub fn dispatch(mailer: Arc<dyn Mailer>, mail: OutboundEmail) {
    tokio::spawn(async move {
        if let Err(err) = mailer.send(&mail).await {
            tracing::warn!(to = %mail.to, error = %err, "failed to send email");
        }
    });
}

/// Publishes a lifecycle event to NATS when a client is configured.
pub fn publish_event<T: Serialize>(nats: Option<async_nats::Client>, subject: &'static str, payload: &T) {
    let Some(client) = nats else { return };
    let bytes = match serde_json::to_vec(payload) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(subject, error = %err, "failed to encode event");
            return;
        }
    };
    tokio::spawn(async move {
        if let Err(err) = client.publish(subject, bytes.into()).await {
            tracing::warn!(subject, error = %err, "failed to publish event");
        }
    });
}

/// Renders a minor-unit amount as a decimal string, e.g. `1250` -> `12.50`.
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

pub fn order_confirmation_email(order: &Order, items: &[OrderItem], user: &User) -> OutboundEmail {
    let item_rows: String = items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{} &times; {}</td><td align=\"right\">{}</td></tr>",
                item.name,
                item.quantity,
                format_amount(item.subtotal)
            )
        })
        .collect();
    let html = format!(
        "<h2>Order Confirmed!</h2>\
         <p>Hi {first_name},</p>\
         <p>Thank you for your order. It has been received and is being processed.</p>\
         <p><strong>Order Number:</strong> {number}<br>\
         <strong>Payment Method:</strong> {method}<br>\
         <strong>Payment Status:</strong> {pay_status}</p>\
         <table width=\"100%\">{item_rows}</table>\
         <p>Subtotal: {subtotal}<br>Shipping: {shipping}<br><strong>Total: {total}</strong></p>",
        first_name = user.first_name,
        number = order.order_number,
        method = order.payment_method,
        pay_status = order.payment_status,
        subtotal = format_amount(order.subtotal),
        shipping = format_amount(order.shipping_cost),
        total = format_amount(order.total),
    );
    OutboundEmail {
        to: user.email.clone(),
        subject: format!("Order Confirmation - {}", order.order_number),
        text: format!(
            "Thank you for your order! Your order number is {}.",
            order.order_number
        ),
        html,
    }
}

pub fn order_status_email(order: &Order, user: &User) -> OutboundEmail {
    let tracking = order
        .tracking_number
        .as_deref()
        .map(|t| format!("<p><strong>Tracking Number:</strong> {t}</p>"))
        .unwrap_or_default();
    let html = format!(
        "<h2>Order Update</h2>\
         <p>Hi {first_name},</p>\
         <p>Your order {number} status has been updated.</p>\
         <p><strong>New Status: {status}</strong></p>{tracking}",
        first_name = user.first_name,
        number = order.order_number,
        status = order.status,
    );
    OutboundEmail {
        to: user.email.clone(),
        subject: format!("Order Update - {}", order.order_number),
        text: format!(
            "Your order {} status has been updated to {}.",
            order.order_number, order.status
        ),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "rhea@example.com".into(),
            first_name: "Rhea".into(),
            last_name: "Kapoor".into(),
            role: "user".into(),
            total_orders: 1,
            total_spent: 129_900,
            average_order_value: 129_900,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_order() -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-20260829-00001".into(),
            user_id: Uuid::new_v4(),
            subtotal: 125_000,
            tax: 0,
            shipping_cost: 0,
            discount: 0,
            total: 125_000,
            status: "shipped".into(),
            payment_method: "card".into(),
            payment_status: "completed".into(),
            transaction_id: None,
            payment_gateway: None,
            paid_at: None,
            tracking_number: Some("TRK-99".into()),
            customer_notes: None,
            shipping_address: serde_json::json!({}),
            billing_address: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(format_amount(125_000), "1250.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(-130), "-1.30");
    }

    #[test]
    fn confirmation_email_carries_order_number() {
        let mail = order_confirmation_email(&sample_order(), &[], &sample_user());
        assert_eq!(mail.to, "rhea@example.com");
        assert!(mail.subject.contains("ORD-20260829-00001"));
        assert!(mail.text.contains("ORD-20260829-00001"));
    }

    #[test]
    fn status_email_includes_tracking_when_present() {
        let mail = order_status_email(&sample_order(), &sample_user());
        assert!(mail.html.contains("TRK-99"));
        assert!(mail.html.contains("shipped"));
    }
}
