use super::HttpClient;
use crate::domain_model::*;
use crate::domain_port::*;

pub const AUTH_PATH: &str = "/auth";
pub const VERIFICATION_PATH: &str = "/auth/verification";
pub const CARDS_PATH: &str = "/cards";
pub const TRANSFER_PATH: &str = "/transfer";

pub struct HttpBankApi {
    http: HttpClient,
}

impl HttpBankApi {
    pub fn new(http: HttpClient) -> Self {
        HttpBankApi { http }
    }
}

#[async_trait::async_trait]
impl BankApi for HttpBankApi {
    async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, TransportError> {
        self.http.post(AUTH_PATH, credentials, None).await
    }

    async fn verify(&self, request: &VerificationRequest) -> Result<ApiResponse, TransportError> {
        self.http.post(VERIFICATION_PATH, request, None).await
    }

    async fn cards(&self, token: &SessionToken) -> Result<ApiResponse, TransportError> {
        self.http.get(CARDS_PATH, Some(token)).await
    }

    async fn transfer(
        &self,
        token: &SessionToken,
        request: &TransferRequest,
    ) -> Result<ApiResponse, TransportError> {
        self.http.post(TRANSFER_PATH, request, Some(token)).await
    }
}
