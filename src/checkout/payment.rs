use rand::Rng;
use rust_decimal::Decimal;
use crate::domain::{PaymentData, PaymentMethod};

const MERCHANT_NAME: &str = "LOJA DO SERVIDOR";
const MERCHANT_CITY: &str = "SAO PAULO";

/// Synthetic payment artefacts. Nothing is registered with a payment provider;
/// an administrator confirms payment by hand.
pub fn generate_payment_data(method: PaymentMethod, total: Decimal) -> PaymentData {
    let mut rng = rand::thread_rng();
    match method {
        PaymentMethod::PixCopyPaste => PaymentData::Key(format!(
            "{:04}.{:04}.{:04}-{:02}",
            rng.gen_range(1000..=9999),
            rng.gen_range(1000..=9999),
            rng.gen_range(1000..=9999),
            rng.gen_range(10..=99),
        )),
        PaymentMethod::PixQrCode => PaymentData::QrPayload(format!(
            "00020126580014BR.GOV.BCB.PIX0136{}5204000053039865405{:.2}5802BR5925{}6009{}61080540900062250521{}6304",
            digits(&mut rng, 30),
            total,
            MERCHANT_NAME,
            MERCHANT_CITY,
            digits(&mut rng, 20),
        )),
    }
}

fn digits(rng: &mut impl Rng, count: usize) -> String {
    (0..count)
        .map(|i| {
            let low = if i == 0 { 1 } else { 0 };
            char::from(b'0' + rng.gen_range(low..10u8))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape() {
        let PaymentData::Key(key) = generate_payment_data(PaymentMethod::PixCopyPaste, Decimal::ONE) else {
            panic!("expected a key");
        };
        let parts: Vec<&str> = key.split(['.', '-']).collect();
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), [4, 4, 4, 2]);
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_qr_payload_embeds_amount() {
        let data = generate_payment_data(PaymentMethod::PixQrCode, Decimal::new(3150, 2));
        assert!(matches!(data, PaymentData::QrPayload(_)));
        assert!(data.as_str().contains("540531.50"));
        assert!(data.as_str().starts_with("00020126580014BR.GOV.BCB.PIX0136"));
        assert!(data.as_str().ends_with("6304"));
    }
}
