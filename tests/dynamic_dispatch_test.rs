use loanflow::domain::channel::{Channel, Envelope};
use loanflow::domain::loan::Loan;
use loanflow::domain::ports::{MessageBus, PublisherRef, SubscriptionBox};
use loanflow::infrastructure::in_memory::InMemoryBroker;
use std::sync::Arc;

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let broker = Arc::new(InMemoryBroker::default());
    let mut subscription: SubscriptionBox = broker.subscribe(&[Channel::Approved]).await.unwrap();
    let publisher: PublisherRef = broker.clone();

    // Verify Send + Sync by spawning tasks
    let publish_handle = tokio::spawn(async move {
        let mut loan = Loan::new("abc", "Kim", 500).unwrap();
        loan.set_status("APPROVED").unwrap();
        publisher
            .publish(Envelope::new(Channel::Approved, loan))
            .await
            .unwrap();
    });

    let receive_handle = tokio::spawn(async move { subscription.recv().await.unwrap().unwrap() });

    publish_handle.await.unwrap();
    let envelope = receive_handle.await.unwrap();
    assert_eq!(envelope.channel, Channel::Approved);
    assert_eq!(envelope.loan.id(), "abc");
}
