use serde::{Deserialize, Serialize};

/// Request to start a payment for a patient.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreatePaymentRequest {
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(rename = "patientName")]
    pub patient_name: String,
    #[serde(rename = "patientEmail")]
    pub patient_email: String,
    pub amount: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Returned when a payment intent is created; the client secret is handed to
/// the external payment widget and never used by this client directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
}

/// Current state of a payment, as reported by the billing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    #[serde(rename = "paymentId")]
    pub payment_id: String,
    #[serde(rename = "patientId")]
    pub patient_id: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "receiptUrl")]
    pub receipt_url: Option<String>,
}

impl PaymentResponse {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "canceled" | "failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_intent_deserializes_wire_names() {
        let json = r#"{"paymentIntentId":"pi_123","clientSecret":"pi_123_secret","status":"requires_payment_method","amount":120.5,"currency":"usd"}"#;
        let intent: PaymentIntentResponse = serde_json::from_str(json).expect("intent json");
        assert_eq!(intent.payment_intent_id, "pi_123");
        assert_eq!(intent.amount, 120.5);
    }

    #[test]
    fn test_payment_response_terminal_states() {
        let json = r#"{"paymentId":"pi_123","patientId":"p1","status":"succeeded","amount":50.0,"currency":"usd","receiptUrl":null}"#;
        let payment: PaymentResponse = serde_json::from_str(json).expect("payment json");
        assert!(payment.is_terminal());

        let pending = PaymentResponse {
            status: "processing".to_string(),
            ..payment
        };
        assert!(!pending.is_terminal());
    }
}
