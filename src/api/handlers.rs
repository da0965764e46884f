use actix_web::{web, HttpResponse, Responder};
use log::warn;

use super::schema::{
    ChainResponse, ErrorResponse, MineResponse, RegisterNodeRequest, RegisterNodeResponse,
    ResolveResponse, TransactionRequest, TransactionResponse, WalletResponse,
};
use crate::blockchain::{Address, ChainValidity, PowError, Transaction};
use crate::node::{Node, NodeError};

/// Shared node state
pub type NodeData = web::Data<Node>;

fn error_body(message: String) -> ErrorResponse {
    ErrorResponse { error: message }
}

/// Get the full chain
///
/// Returns the blocks, pending transactions and validity status
#[utoipa::path(
    get,
    path = "/api/v1/chain",
    responses(
        (status = 200, description = "Chain retrieved successfully", body = ChainResponse)
    )
)]
pub async fn get_chain(node: NodeData) -> impl Responder {
    let chain = node.chain_snapshot();
    let validity = chain.validate();

    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        chain,
        validity,
    })
}

/// Get all pending transactions
///
/// Returns all transactions waiting to be sealed into a block
#[utoipa::path(
    get,
    path = "/api/v1/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(node: NodeData) -> impl Responder {
    HttpResponse::Ok().json(node.pending_transactions())
}

/// Create a new transaction
///
/// Adds a new transaction to the pending buffer
#[utoipa::path(
    post,
    path = "/api/v1/transactions/new",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction accepted", body = TransactionResponse)
    )
)]
pub async fn new_transaction(
    node: NodeData,
    transaction_req: web::Json<TransactionRequest>,
) -> impl Responder {
    let TransactionRequest {
        sender,
        recipient,
        amount,
    } = transaction_req.into_inner();

    let block_index = node.submit_transaction(Address(sender), Address(recipient), amount);

    HttpResponse::Created().json(TransactionResponse {
        message: format!("Transaction will be added to Block {}", block_index),
        block_index,
    })
}

/// Mine a new block
///
/// Searches for the next proof and seals all pending transactions
#[utoipa::path(
    post,
    path = "/api/v1/mine",
    responses(
        (status = 200, description = "Block mined successfully", body = MineResponse),
        (status = 408, description = "Proof search timed out", body = ErrorResponse),
        (status = 409, description = "Chain changed during the search", body = ErrorResponse),
        (status = 503, description = "Node is shutting down", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn mine_block(node: NodeData) -> impl Responder {
    match node.mine().await {
        Ok(block) => HttpResponse::Ok().json(MineResponse {
            message: "New Block Forged".to_string(),
            block,
        }),
        Err(err) => {
            warn!("Mining failed: {}", err);
            let body = error_body(format!("Failed to mine block: {}", err));

            match err {
                NodeError::PowError(PowError::TimedOut { .. }) => {
                    HttpResponse::RequestTimeout().json(body)
                }
                NodeError::PowError(PowError::Cancelled { .. }) => {
                    HttpResponse::ServiceUnavailable().json(body)
                }
                NodeError::ChainError(_) => HttpResponse::Conflict().json(body),
                NodeError::WorkerError(_) => HttpResponse::InternalServerError().json(body),
            }
        }
    }
}

/// Validate the chain
///
/// Checks proofs and digest links across the whole chain
#[utoipa::path(
    get,
    path = "/api/v1/validate",
    responses(
        (status = 200, description = "Chain validation result", body = ChainValidity)
    )
)]
pub async fn validate_chain(node: NodeData) -> impl Responder {
    HttpResponse::Ok().json(node.validate())
}

/// List registered peers
#[utoipa::path(
    get,
    path = "/api/v1/nodes",
    responses(
        (status = 200, description = "Registered peer identifiers", body = Vec<Address>)
    )
)]
pub async fn get_nodes(node: NodeData) -> impl Responder {
    HttpResponse::Ok().json(node.peer_ids())
}

/// Register a peer
///
/// Adds the peer or replaces the chain snapshot it previously supplied
#[utoipa::path(
    post,
    path = "/api/v1/nodes/register",
    request_body = RegisterNodeRequest,
    responses(
        (status = 201, description = "Peer registered", body = RegisterNodeResponse),
        (status = 400, description = "Empty identifier", body = ErrorResponse)
    )
)]
pub async fn register_node(
    node: NodeData,
    register_req: web::Json<RegisterNodeRequest>,
) -> impl Responder {
    let RegisterNodeRequest { identifier, chain } = register_req.into_inner();

    if identifier.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(error_body("Peer identifier must not be empty".to_string()));
    }

    let total_nodes = node.register_peer(Address(identifier.clone()), chain);

    HttpResponse::Created().json(RegisterNodeResponse {
        message: format!("Peer {} has been registered", identifier),
        total_nodes,
    })
}

/// Resolve conflicts
///
/// Adopts the first registered peer chain that validates and is longer
#[utoipa::path(
    post,
    path = "/api/v1/nodes/resolve",
    responses(
        (status = 200, description = "Resolution outcome", body = ResolveResponse)
    )
)]
pub async fn resolve_conflicts(node: NodeData) -> impl Responder {
    let replaced = node.resolve_conflicts();

    HttpResponse::Ok().json(ResolveResponse {
        replaced,
        chain: node.chain_snapshot(),
    })
}

/// Get the node's identity
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    responses(
        (status = 200, description = "Node identity", body = WalletResponse)
    )
)]
pub async fn get_wallet(node: NodeData) -> impl Responder {
    HttpResponse::Ok().json(WalletResponse {
        address: node.identity().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::configure_routes;
    use crate::blockchain::pow::find_proof;
    use crate::blockchain::Chain;
    use crate::config::NodeConfig;
    use actix_web::{http::StatusCode, test, App};

    fn node_data() -> NodeData {
        web::Data::new(Node::new(&NodeConfig::default()))
    }

    #[actix_web::test]
    async fn test_transaction_then_mine() {
        let node = node_data();
        let app = test::init_service(
            App::new().app_data(node.clone()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new")
            .set_json(TransactionRequest {
                sender: "alice".to_string(),
                recipient: "bob".to_string(),
                amount: 5.0,
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: TransactionResponse = test::read_body_json(resp).await;
        assert_eq!(body.block_index, 2);

        let req = test::TestRequest::post().uri("/api/v1/mine").to_request();
        let body: MineResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.block.proof(), 4104);
        assert_eq!(body.block.transactions().len(), 1);

        let req = test::TestRequest::get().uri("/api/v1/chain").to_request();
        let body: ChainResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.length, 2);
        assert_eq!(body.validity, ChainValidity::CorrectChain);
        assert!(body.chain.pending_transactions().is_empty());
    }

    #[actix_web::test]
    async fn test_register_and_resolve() {
        let node = node_data();
        let app = test::init_service(
            App::new().app_data(node.clone()).configure(configure_routes),
        )
        .await;

        let mut peer = Chain::new();
        let (proof, digest) = (find_proof(peer.last_block().proof()), peer.last_block().digest());
        peer.seal_block(proof, digest).unwrap();

        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/register")
            .set_json(RegisterNodeRequest {
                identifier: "peer-1".to_string(),
                chain: Some(peer.snapshot()),
            })
            .to_request();
        let body: RegisterNodeResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.total_nodes, 2);

        let req = test::TestRequest::post().uri("/api/v1/nodes/resolve").to_request();
        let body: ResolveResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.replaced);
        assert_eq!(body.chain, peer.snapshot());

        let req = test::TestRequest::post().uri("/api/v1/nodes/resolve").to_request();
        let body: ResolveResponse = test::call_and_read_body_json(&app, req).await;
        assert!(!body.replaced);
    }

    #[actix_web::test]
    async fn test_register_rejects_empty_identifier() {
        let app = test::init_service(
            App::new().app_data(node_data()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/register")
            .set_json(serde_json::json!({ "identifier": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_mine_after_shutdown() {
        let node = node_data();
        node.shutdown();
        let app = test::init_service(
            App::new().app_data(node.clone()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/v1/mine").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
