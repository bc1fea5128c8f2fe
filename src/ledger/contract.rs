//! DentalRecords contract client
//!
//! Implements [`RecordStore`] and [`RecordSubmitter`] on top of a JSON-RPC
//! endpoint. Signing is left to the endpoint: submissions use
//! `eth_sendTransaction` with the dentist account as sender.

use async_trait::async_trait;
use std::time::Duration;

use super::abi::{self, Token};
use super::error::{LedgerError, LedgerResult};
use super::rpc::JsonRpcClient;
use super::types::{Address, DentistProfile, NewRecord, Record, Role, TxHash};
use super::{RecordStore, RecordSubmitter};

const DENTIST_INFO: &str = "getDentistInfo(address)";
const ADD_RECORD: &str = "addDentalRecord(address,string,string,string)";

/// Validated connection settings for the deployed contract
#[derive(Debug, Clone)]
pub struct ContractSettings {
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Deployed contract address on the configured network
    pub contract_address: Address,
    /// Chain id the contract is deployed on
    pub chain_id: u64,
    /// Per-request timeout enforced by the HTTP client
    pub request_timeout: Duration,
}

/// Client for the deployed `DentalRecords` contract
pub struct DentalRecordsContract {
    rpc: JsonRpcClient,
    address: Address,
    chain_id: u64,
}

impl DentalRecordsContract {
    pub fn new(settings: &ContractSettings) -> LedgerResult<Self> {
        let rpc = JsonRpcClient::new(settings.rpc_url.clone(), settings.request_timeout)?;
        Ok(Self {
            rpc,
            address: settings.contract_address,
            chain_id: settings.chain_id,
        })
    }

    /// Contract address calls are sent to
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Chain id this client was configured for
    pub fn expected_chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Chain id actually served by the endpoint
    pub async fn chain_id(&self) -> LedgerResult<u64> {
        self.rpc.chain_id().await
    }

    async fn call(&self, signature: &str, args: &[Token]) -> LedgerResult<Vec<u8>> {
        let data = abi::encode_call(signature, args);
        self.rpc.eth_call(&self.address, &data).await
    }
}

#[async_trait]
impl RecordStore for DentalRecordsContract {
    async fn record_count(&self, role: Role, owner: &Address) -> LedgerResult<u64> {
        let raw = self
            .call(role.count_signature(), &[Token::Address(*owner)])
            .await?;
        Ok(abi::decode_count(&raw)?)
    }

    async fn record_at(&self, role: Role, owner: &Address, index: u64) -> LedgerResult<Record> {
        let raw = self
            .call(
                role.record_signature(),
                &[Token::Address(*owner), Token::Uint(index)],
            )
            .await?;
        Ok(abi::decode_record(&raw)?)
    }

    async fn dentist_profile(&self, dentist: &Address) -> LedgerResult<DentistProfile> {
        let raw = self.call(DENTIST_INFO, &[Token::Address(*dentist)]).await?;
        Ok(abi::decode_profile(&raw)?)
    }

    async fn health_check(&self) -> LedgerResult<()> {
        let block = self.rpc.block_number().await?;
        tracing::trace!(block, "Ledger endpoint reachable");
        Ok(())
    }
}

#[async_trait]
impl RecordSubmitter for DentalRecordsContract {
    async fn submit_record(&self, dentist: &Address, record: &NewRecord) -> LedgerResult<TxHash> {
        let data = abi::encode_call(
            ADD_RECORD,
            &[
                Token::Address(record.patient),
                Token::String(record.procedure.clone()),
                Token::String(record.description.clone()),
                Token::String(record.diagnosis.clone()),
            ],
        );

        self.rpc
            .send_transaction(dentist, &self.address, &data)
            .await
            .map_err(|e| match e {
                LedgerError::SubmissionRejected(_) | LedgerError::NotConfigured(_) => e,
                other => LedgerError::SubmissionRejected(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::abi::ParamType;
    use axum::{extract::State, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    const CONTRACT: Address = Address::new([0xc0; 20]);
    const DENTIST: Address = Address::new([0xd1; 20]);
    const PATIENT: Address = Address::new([0x9a; 20]);

    /// Minimal JSON-RPC node serving one dentist's records
    struct MockNode {
        records: Vec<Record>,
        signer: Address,
        sent: Mutex<Vec<Value>>,
    }

    impl MockNode {
        fn answer_call(&self, to: &str, data: &[u8]) -> Result<Value, (i64, String)> {
            if to != CONTRACT.to_string() {
                return Ok(json!("0x"));
            }
            let (sel, args) = data.split_at(4);
            let count = abi::selector(Role::Dentist.count_signature());
            let by_index = abi::selector(Role::Dentist.record_signature());
            let info = abi::selector(DENTIST_INFO);

            let encoded = if sel == count.as_slice() {
                abi::encode(&[Token::Uint(self.records.len() as u64)])
            } else if sel == by_index.as_slice() {
                let tokens = abi::decode(&[ParamType::Address, ParamType::Uint], args)
                    .map_err(|e| (-32602, e.to_string()))?;
                let index = match tokens[1] {
                    Token::Uint(i) => i as usize,
                    _ => return Err((-32602, "bad index".into())),
                };
                let record = self
                    .records
                    .get(index)
                    .ok_or((3, "execution reverted".to_string()))?;
                abi::encode(&[
                    Token::Address(record.counterparty),
                    Token::String(record.procedure.clone()),
                    Token::String(record.description.clone()),
                    Token::String(record.diagnosis.clone()),
                    Token::Uint(record.timestamp),
                ])
            } else if sel == info.as_slice() {
                abi::encode(&[
                    Token::String("Dr. Ada".into()),
                    Token::String("LIC-42".into()),
                    Token::String("Bright Smiles".into()),
                ])
            } else {
                return Err((3, "execution reverted".into()));
            };
            Ok(json!(abi::encode_hex(&encoded)))
        }

        fn answer_send(&self, tx: &Value) -> Result<Value, (i64, String)> {
            if tx["from"].as_str() != Some(self.signer.to_string().as_str()) {
                return Err((-32000, "unknown account".into()));
            }
            self.sent.lock().unwrap().push(tx.clone());
            Ok(json!(TxHash::new([0x77; 32]).to_string()))
        }
    }

    async fn handle(State(node): State<Arc<MockNode>>, Json(req): Json<Value>) -> Json<Value> {
        let id = req["id"].clone();
        let params = &req["params"];
        let reply = match req["method"].as_str().unwrap_or_default() {
            "eth_call" => {
                let data = abi::decode_hex(params[0]["data"].as_str().unwrap()).unwrap();
                node.answer_call(params[0]["to"].as_str().unwrap(), &data)
            }
            "eth_sendTransaction" => node.answer_send(&params[0]),
            "eth_blockNumber" => Ok(json!("0x10")),
            "eth_chainId" => Ok(json!("0xaa36a7")),
            other => Err((-32601, format!("method {other} not found"))),
        };

        Json(match reply {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err((code, message)) => {
                json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
            }
        })
    }

    async fn spawn_node(node: Arc<MockNode>) -> String {
        let app = Router::new().route("/", post(handle)).with_state(node);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn record(procedure: &str, timestamp: u64) -> Record {
        Record {
            counterparty: PATIENT,
            procedure: procedure.to_string(),
            description: format!("{procedure} description"),
            diagnosis: "healthy".to_string(),
            timestamp,
        }
    }

    async fn setup() -> (DentalRecordsContract, Arc<MockNode>) {
        let node = Arc::new(MockNode {
            records: vec![record("Cleaning", 100), record("Filling", 300)],
            signer: DENTIST,
            sent: Mutex::new(Vec::new()),
        });
        let url = spawn_node(Arc::clone(&node)).await;
        let contract = DentalRecordsContract::new(&ContractSettings {
            rpc_url: url,
            contract_address: CONTRACT,
            chain_id: 11_155_111,
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();
        (contract, node)
    }

    #[tokio::test]
    async fn test_record_count_and_fetch() {
        let (contract, _node) = setup().await;

        let count = contract.record_count(Role::Dentist, &DENTIST).await.unwrap();
        assert_eq!(count, 2);

        let second = contract.record_at(Role::Dentist, &DENTIST, 1).await.unwrap();
        assert_eq!(second, record("Filling", 300));
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_ledger_decided() {
        let (contract, _node) = setup().await;

        let err = contract
            .record_at(Role::Dentist, &DENTIST, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rpc { code: 3, .. }));
    }

    #[tokio::test]
    async fn test_dentist_profile() {
        let (contract, _node) = setup().await;

        let profile = contract.dentist_profile(&DENTIST).await.unwrap();
        assert_eq!(profile.name, "Dr. Ada");
        assert_eq!(profile.license_number, "LIC-42");
        assert_eq!(profile.clinic_name, "Bright Smiles");
    }

    #[tokio::test]
    async fn test_chain_id_and_health() {
        let (contract, _node) = setup().await;

        assert_eq!(contract.chain_id().await.unwrap(), 11_155_111);
        assert_eq!(contract.expected_chain_id(), 11_155_111);
        assert!(contract.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_record_encodes_call() {
        let (contract, node) = setup().await;
        let new_record = NewRecord::new(PATIENT, "Crown", "Porcelain crown", "Fracture");

        let hash = contract.submit_record(&DENTIST, &new_record).await.unwrap();
        assert_eq!(hash, TxHash::new([0x77; 32]));

        let sent = node.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["to"], json!(CONTRACT.to_string()));

        let data = abi::decode_hex(sent[0]["data"].as_str().unwrap()).unwrap();
        assert_eq!(&data[..4], &abi::selector(ADD_RECORD));
        let args = abi::decode(
            &[
                ParamType::Address,
                ParamType::String,
                ParamType::String,
                ParamType::String,
            ],
            &data[4..],
        )
        .unwrap();
        assert_eq!(args[0], Token::Address(PATIENT));
        assert_eq!(args[1], Token::String("Crown".into()));
        assert_eq!(args[3], Token::String("Fracture".into()));
    }

    #[tokio::test]
    async fn test_submit_from_unknown_signer_is_rejected() {
        let (contract, node) = setup().await;
        let new_record = NewRecord::new(PATIENT, "Crown", "Porcelain crown", "Fracture");

        let err = contract
            .submit_record(&PATIENT, &new_record)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::SubmissionRejected(_)));
        assert!(node.sent.lock().unwrap().is_empty());
    }
}
