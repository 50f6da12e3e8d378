use fair_payment_engine::{
    db_types::{NewPaymentReference, OwnerRecord, PaymentOwner, PaymentReference, ReferenceStatusUpdate},
    traits::{
        ConfirmedPayment,
        GatewayError,
        InitializePayment,
        Notification,
        NotificationError,
        Notifier,
        OwnerManagement,
        PaymentConfirmation,
        PaymentGateway,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        PaymentSession,
        ReferenceRegistry,
        VerifiedPayment,
    },
};
use mockall::mock;

mock! {
    pub PaymentDb {}
    impl Clone for PaymentDb {
        fn clone(&self) -> Self;
    }
    impl ReferenceRegistry for PaymentDb {
        async fn create_reference(&self, reference: NewPaymentReference) -> Result<PaymentReference, PaymentGatewayError>;
        async fn fetch_reference(&self, reference: &str) -> Result<Option<PaymentReference>, PaymentGatewayError>;
        async fn update_reference_status(&self, reference: &str, update: ReferenceStatusUpdate) -> Result<PaymentReference, PaymentGatewayError>;
    }
    impl OwnerManagement for PaymentDb {
        async fn fetch_owner(&self, owner: &PaymentOwner) -> Result<Option<OwnerRecord>, PaymentGatewayError>;
    }
    impl PaymentGatewayDatabase for PaymentDb {
        fn url(&self) -> &str;
        async fn confirm_payment(&self, payment: PaymentConfirmation) -> Result<ConfirmedPayment, PaymentGatewayError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn initialize(&self, request: InitializePayment) -> Result<PaymentSession, GatewayError>;
        async fn verify(&self, reference: &str) -> Result<VerifiedPayment, GatewayError>;
        fn validate_webhook_signature(&self, raw_body: &[u8], signature: &str) -> bool;
    }
}

mock! {
    pub Mailer {}
    impl Notifier for Mailer {
        async fn send(&self, notification: Notification) -> Result<(), NotificationError>;
    }
}
