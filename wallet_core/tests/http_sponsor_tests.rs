//! Client and sponsor service talking over a real socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use freecpu_crypto::{keypair_from_seed, KeyStoreProvider};
use freecpu_nullables::NullChain;
use freecpu_policy::{Policy, PolicyConfig};
use freecpu_rpc::{RpcServer, SponsorService};
use freecpu_types::{HeaderHints, NetworkId, PermissionLevel, PrivateKey, SignRequest};
use freecpu_wallet_core::{
    HttpSponsorClient, SponsorApi, SponsorError, TransferRequest, UnavailableReason, Wallet,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn alice() -> PermissionLevel {
    "alice@active".parse().unwrap()
}

fn sponsor_level() -> PermissionLevel {
    "eosiactester@freecpu".parse().unwrap()
}

fn chain() -> Arc<NullChain> {
    Arc::new(
        NullChain::for_network(NetworkId::Kylin)
            .with_authority(alice(), keypair_from_seed(&[1; 32]).public)
            .with_authority(sponsor_level(), keypair_from_seed(&[7; 32]).public),
    )
}

async fn spawn_sponsor(chain: Arc<NullChain>) -> (SocketAddr, oneshot::Sender<()>) {
    let policy = Policy::from_config(&PolicyConfig {
        token_contracts: vec!["eosio.token".parse().unwrap()],
        allowed_accounts: vec!["cmichelkylin".parse().unwrap()],
    })
    .with_sponsor(sponsor_level());
    let service = SponsorService::new(
        policy,
        chain,
        Arc::new(KeyStoreProvider::from_keys(vec![PrivateKey([7; 32])])),
        NetworkId::Kylin.chain_id(),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(RpcServer::new(addr, service).serve(listener, async {
        let _ = rx.await;
    }));
    (addr, tx)
}

fn wallet(chain: &Arc<NullChain>, addr: SocketAddr) -> Wallet {
    let timeout = Duration::from_secs(5);
    let client = HttpSponsorClient::new(&format!("http://{addr}"), timeout).unwrap();
    Wallet::new(
        alice(),
        chain.clone(),
        Arc::new(KeyStoreProvider::from_keys(vec![PrivateKey([1; 32])])),
    )
    .with_sponsor(Arc::new(client), sponsor_level(), timeout)
}

fn transfer(to: &str) -> TransferRequest {
    TransferRequest {
        receiver: Some(to.parse().unwrap()),
        quantity: Some("1.0000 EOS".parse().unwrap()),
        memo: "coffee".into(),
        repetitions: 1,
    }
}

#[tokio::test]
async fn sponsored_over_http() {
    let chain = chain();
    let (addr, shutdown) = spawn_sponsor(chain.clone()).await;

    let receipt = wallet(&chain, addr)
        .transfer(&transfer("cmichelkylin"))
        .await
        .unwrap();

    assert!(receipt.sponsored);
    assert_eq!(receipt.signed.signatures.len(), 2);
    assert_eq!(receipt.actions[0].data["memo"], "coffee");
    assert_eq!(chain.pushed().len(), 1);
    let _ = shutdown.send(());
}

#[tokio::test]
async fn http_rejection_carries_reason_into_fallback() {
    let chain = chain();
    let (addr, shutdown) = spawn_sponsor(chain.clone()).await;

    let receipt = wallet(&chain, addr).transfer(&transfer("bob")).await.unwrap();

    assert!(!receipt.sponsored);
    assert_eq!(
        receipt.fallback_reason,
        Some(UnavailableReason::PolicyRejection(
            "CPU for transfers to other accounts are not paid".into()
        ))
    );
    let _ = shutdown.send(());
}

#[tokio::test]
async fn missing_transaction_is_rejected_over_http() {
    let chain = chain();
    let (addr, shutdown) = spawn_sponsor(chain).await;
    let client = HttpSponsorClient::new(&format!("http://{addr}/"), Duration::from_secs(5)).unwrap();

    let err = client
        .request_signature(&SignRequest {
            transaction: None,
            header_hints: HeaderHints::default(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, SponsorError::Rejected("No transaction passed".into()));
    let _ = shutdown.send(());
}
