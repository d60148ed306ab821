//! End-to-end flows through the running actor system, plus client-level
//! checks against mocked actors.

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use crate::app_system::{StorefrontError, StorefrontSystem};
use crate::checkout::Cart;
use crate::clients::{CatalogClient, CategoryClient, ProductClient, ProductForm};
use crate::config::test_config;
use crate::domain::{
    Category, Member, OrderStatus, PaymentMethod, Product, RoleId, Ticket, TicketStatus,
};
use crate::mock_framework::{
    create_mock_client, expect_action, expect_delete, expect_get, expect_list, expect_update,
};
use crate::platform::{InMemoryChat, RoleAdminPolicy};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

const ADMIN_ROLE: RoleId = RoleId(900);

struct Harness {
    system: StorefrontSystem,
    chat: Arc<InMemoryChat>,
    admin: Member,
    product: Product,
}

async fn start(stock: u32) -> Harness {
    let chat = Arc::new(InMemoryChat::new());
    let system = StorefrontSystem::start(&test_config(), chat.clone());
    let admin = Member::new(1).with_role(ADMIN_ROLE);
    let product = add_product(&system, &admin, stock).await;
    Harness { system, chat, admin, product }
}

async fn add_product(system: &StorefrontSystem, admin: &Member, stock: u32) -> Product {
    let category = system
        .catalog
        .add_category(admin, "Robux".to_string(), None)
        .await
        .unwrap();
    system
        .catalog
        .add_product(
            admin,
            ProductForm {
                name: "Robux 400".to_string(),
                price: "10,00".to_string(),
                stock: stock.to_string(),
                category_id: category.id,
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

impl Harness {
    async fn open_ticket(&self, buyer: &Member, quantity: u32) -> Ticket {
        self.system
            .checkout
            .finalize_purchase(buyer.clone(), self.product.id.clone(), quantity)
            .await
            .unwrap()
    }

    async fn open_with_order(&self, buyer: &Member, quantity: u32) -> Ticket {
        let ticket = self.open_ticket(buyer, quantity).await;
        self.system
            .checkout
            .choose_method(buyer.clone(), ticket.code.clone(), PaymentMethod::PixCopyPaste)
            .await
            .unwrap();
        ticket
    }

    async fn stock(&self) -> u32 {
        self.system.products.stock_level(self.product.id.clone()).await.unwrap()
    }

    async fn ticket(&self, code: &str) -> Ticket {
        self.system.tickets.get_ticket(code.to_string()).await.unwrap().unwrap()
    }
}

#[tokio::test]
async fn test_second_finalize_for_same_buyer_is_refused() {
    let h = start(10).await;
    let buyer = Member::new(42);
    let first = h.open_ticket(&buyer, 1).await;

    let second = h
        .system
        .checkout
        .finalize_purchase(buyer.clone(), h.product.id.clone(), 1)
        .await;
    assert_eq!(
        second,
        Err(StorefrontError::DuplicateOpenTicket { buyer: buyer.id, existing: first.code.clone() })
    );
    assert_eq!(h.system.tickets.list_open().await.unwrap().len(), 1);
    assert_eq!(h.chat.live_channels().len(), 1);

    let channel = h.chat.channel(first.channel).unwrap();
    assert_eq!(channel.name, format!("ticket-{}", first.code.to_lowercase()));
}

#[tokio::test]
async fn test_racing_approvals_debit_exactly_once() {
    let h = start(5).await;
    let buyer = Member::new(42);
    let ticket = h.open_with_order(&buyer, 3).await;
    assert_eq!(ticket.total, rust_decimal::Decimal::new(3000, 2));

    let second_admin = Member::new(2).administrator();
    let a = {
        let checkout = h.system.checkout.clone();
        let (admin, code) = (h.admin.clone(), ticket.code.clone());
        tokio::spawn(async move { checkout.approve(admin, code).await })
    };
    let b = {
        let checkout = h.system.checkout.clone();
        let code = ticket.code.clone();
        tokio::spawn(async move { checkout.approve(second_admin, code).await })
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(StorefrontError::AlreadyResolved { status: OrderStatus::Approved, .. })
    )));
    assert_eq!(h.stock().await, 2);
    assert_eq!(h.ticket(&ticket.code).await.status, TicketStatus::Approved);
}

#[tokio::test]
async fn test_approval_rechecks_stock_at_debit_time() {
    let h = start(5).await;
    let (alice, bob) = (Member::new(10), Member::new(11));
    let first = h.open_with_order(&alice, 3).await;
    let second = h.open_with_order(&bob, 3).await;

    h.system.checkout.approve(h.admin.clone(), first.code).await.unwrap();
    let refused = h.system.checkout.approve(h.admin.clone(), second.code.clone()).await;

    assert_eq!(refused, Err(StorefrontError::InsufficientStock { requested: 3, available: 2 }));
    assert_eq!(h.stock().await, 2);
    assert!(h.ticket(&second.code).await.is_open());
    let order = h.system.orders.find_by_ticket(second.code).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::AwaitingPayment);
}

#[tokio::test]
async fn test_reject_never_touches_stock() {
    let h = start(5).await;
    let with_order = h.open_with_order(&Member::new(10), 2).await;
    let without_order = h.open_ticket(&Member::new(11), 1).await;

    let rejected = h
        .system
        .checkout
        .reject(h.admin.clone(), with_order.code.clone(), "Pagamento não encontrado".to_string())
        .await
        .unwrap();
    assert_eq!(rejected.status, TicketStatus::Rejected);
    let order = h.system.orders.find_by_ticket(with_order.code).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Rejected);
    assert_eq!(order.rejection_reason.as_deref(), Some("Pagamento não encontrado"));

    h.system
        .checkout
        .reject(h.admin.clone(), without_order.code.clone(), "Sem resposta".to_string())
        .await
        .unwrap();
    assert!(h.system.orders.find_by_ticket(without_order.code).await.unwrap().is_none());

    assert_eq!(h.stock().await, 5);
    let dms = h.chat.direct_notices(Member::new(10).id);
    assert!(dms.iter().any(|n| n.mentions("Pagamento não encontrado")));
}

#[tokio::test]
async fn test_blank_rejection_reason_is_refused() {
    let h = start(5).await;
    let ticket = h.open_ticket(&Member::new(10), 1).await;
    assert!(matches!(
        h.system.checkout.reject(h.admin.clone(), ticket.code.clone(), "  ".to_string()).await,
        Err(StorefrontError::Validation(_))
    ));
    assert!(h.ticket(&ticket.code).await.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_resolved_ticket_closes_after_delay() {
    let h = start(5).await;
    let buyer = Member::new(42);
    let ticket = h.open_with_order(&buyer, 1).await;

    h.system.checkout.approve(h.admin.clone(), ticket.code.clone()).await.unwrap();
    let approved = h.ticket(&ticket.code).await;
    assert!(approved.close_after.is_some());

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(h.ticket(&ticket.code).await.status, TicketStatus::Approved);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let closed = h.ticket(&ticket.code).await;
    assert_eq!(closed.status, TicketStatus::Closed);
    assert!(closed.close_after.is_none());
    assert!(h.chat.was_deleted(ticket.channel));

    // Closing freed the buyer's slot.
    h.open_ticket(&buyer, 1).await;
}

#[tokio::test(start_paused = true)]
async fn test_close_completes_even_if_channel_deletion_fails() {
    let h = start(5).await;
    let ticket = h.open_ticket(&Member::new(42), 1).await;
    h.chat.fail_channel_deletion(true);

    h.system
        .checkout
        .reject(h.admin.clone(), ticket.code.clone(), "Duplicado".to_string())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(h.ticket(&ticket.code).await.status, TicketStatus::Closed);
    assert!(!h.chat.was_deleted(ticket.channel));
}

#[tokio::test]
async fn test_admin_close_is_terminal() {
    let h = start(5).await;
    let buyer = Member::new(42);
    let ticket = h.open_with_order(&buyer, 1).await;

    let closed = h.system.checkout.close(h.admin.clone(), ticket.code.clone()).await.unwrap();
    assert_eq!(closed.status, TicketStatus::Closed);
    assert!(h.chat.was_deleted(ticket.channel));

    for result in [
        h.system.checkout.approve(h.admin.clone(), ticket.code.clone()).await.map(|_| ()),
        h.system.checkout.reject(h.admin.clone(), ticket.code.clone(), "x".to_string()).await.map(|_| ()),
        h.system.checkout.close(h.admin.clone(), ticket.code.clone()).await.map(|_| ()),
        h.system
            .checkout
            .choose_method(buyer.clone(), ticket.code.clone(), PaymentMethod::PixQrCode)
            .await
            .map(|_| ()),
    ] {
        assert!(matches!(result, Err(StorefrontError::InvalidTransition(_))), "{result:?}");
    }
    assert_eq!(h.stock().await, 5);
    assert_eq!(h.ticket(&ticket.code).await.status, TicketStatus::Closed);
}

#[tokio::test]
async fn test_admin_close_refused_once_resolved() {
    let h = start(5).await;
    let ticket = h.open_with_order(&Member::new(42), 1).await;
    h.system.checkout.approve(h.admin.clone(), ticket.code.clone()).await.unwrap();

    assert!(matches!(
        h.system.checkout.close(h.admin.clone(), ticket.code.clone()).await,
        Err(StorefrontError::InvalidTransition(_))
    ));
    assert_eq!(h.ticket(&ticket.code).await.status, TicketStatus::Approved);
}

#[tokio::test]
async fn test_channel_creation_failure_leaves_no_ticket() {
    let h = start(5).await;
    let buyer = Member::new(42);
    h.chat.fail_channel_creation(true);

    let result = h
        .system
        .checkout
        .finalize_purchase(buyer.clone(), h.product.id.clone(), 1)
        .await;
    assert!(matches!(result, Err(StorefrontError::ExternalIo(_))));
    assert!(h.system.tickets.list_open().await.unwrap().is_empty());
    assert!(h.system.tickets.find_open_by_buyer(buyer.id).await.unwrap().is_none());

    h.chat.fail_channel_creation(false);
    h.open_ticket(&buyer, 1).await;
}

#[tokio::test]
async fn test_closed_direct_messages_do_not_undo_approval() {
    let h = start(5).await;
    let buyer = Member::new(42);
    h.chat.close_direct_messages(buyer.id);
    let ticket = h.open_with_order(&buyer, 3).await;

    let order = h.system.checkout.approve(h.admin.clone(), ticket.code.clone()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Approved);
    assert_eq!(order.approved_by, Some(h.admin.id));
    assert_eq!(h.stock().await, 2);

    let audit = h.chat.channel_notices(test_config().audit_channel.unwrap());
    assert!(audit.iter().any(|n| n.mentions("Estoque restante: 2")));
    let in_ticket = h.chat.channel_notices(ticket.channel);
    assert!(in_ticket.iter().any(|n| n.title == "Pagamento Aprovado"));
}

#[tokio::test]
async fn test_approval_message_carries_delivery_link() {
    let h = start(5).await;
    let buyer = Member::new(42);
    let ticket = h.open_with_order(&buyer, 1).await;
    h.system.checkout.approve(h.admin.clone(), ticket.code).await.unwrap();

    let dms = h.chat.direct_notices(buyer.id);
    assert_eq!(dms.len(), 1);
    assert!(dms[0].mentions(&test_config().delivery_link));
}

#[tokio::test]
async fn test_non_admin_cannot_resolve() {
    let h = start(5).await;
    let buyer = Member::new(42);
    let ticket = h.open_with_order(&buyer, 1).await;
    let outsider = Member::new(7).with_role(RoleId(1));

    assert_eq!(
        h.system.checkout.approve(outsider.clone(), ticket.code.clone()).await,
        Err(StorefrontError::Unauthorized(outsider.id))
    );
    assert_eq!(
        h.system.checkout.close(buyer.clone(), ticket.code.clone()).await,
        Err(StorefrontError::Unauthorized(buyer.id))
    );
    assert_eq!(h.stock().await, 5);
    assert!(h.ticket(&ticket.code).await.is_open());
}

#[tokio::test]
async fn test_only_the_buyer_picks_the_method_and_switching_keeps_one_order() {
    let h = start(5).await;
    let buyer = Member::new(42);
    let ticket = h.open_ticket(&buyer, 2).await;

    assert_eq!(
        h.system
            .checkout
            .choose_method(Member::new(99), ticket.code.clone(), PaymentMethod::PixQrCode)
            .await,
        Err(StorefrontError::Unauthorized(Member::new(99).id))
    );

    let first = h
        .system
        .checkout
        .choose_method(buyer.clone(), ticket.code.clone(), PaymentMethod::PixCopyPaste)
        .await
        .unwrap();
    let second = h
        .system
        .checkout
        .choose_method(buyer.clone(), ticket.code.clone(), PaymentMethod::PixQrCode)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.switched_from, Some(PaymentMethod::PixCopyPaste));
    assert_eq!(h.system.orders.list_recent(20).await.unwrap().len(), 1);
    let payment = h.ticket(&ticket.code).await.payment.unwrap();
    assert_eq!(payment.method, PaymentMethod::PixQrCode);
}

#[tokio::test]
async fn test_expired_cart_cannot_be_finalized() {
    let h = start(5).await;
    let buyer = Member::new(42);
    let opened = Utc::now();
    let cart = Cart::open(buyer.id, &h.product, test_config().cart_timeout, opened).unwrap();

    let late = opened + chrono::Duration::minutes(31);
    assert_eq!(
        h.system.checkout.finalize_cart(buyer.clone(), &cart, late).await,
        Err(StorefrontError::CartExpired)
    );
    assert!(h.system.tickets.list_open().await.unwrap().is_empty());

    let ticket = h.system.checkout.finalize_cart(buyer, &cart, opened).await.unwrap();
    assert_eq!(ticket.quantity, 1);
}

#[tokio::test]
async fn test_category_delete_blocked_while_referenced() {
    let h = start(5).await;
    let category_id = h.product.category_id.clone();

    assert_eq!(
        h.system.catalog.delete_category(&h.admin, category_id.clone()).await,
        Err(StorefrontError::CategoryInUse { count: 1 })
    );
    assert!(h.system.categories.get_category(category_id.clone()).await.unwrap().is_some());
    assert!(h.system.products.get_product(h.product.id.clone()).await.unwrap().is_some());

    h.system.catalog.delete_product(&h.admin, h.product.id.clone()).await.unwrap();
    h.system.catalog.delete_category(&h.admin, category_id).await.unwrap();
}

#[tokio::test]
async fn test_category_rename_reaches_products() {
    let h = start(5).await;
    h.system
        .catalog
        .edit_category(&h.admin, h.product.category_id.clone(), "Robux Premium".to_string(), None)
        .await
        .unwrap();

    let product = h.system.products.get_product(h.product.id.clone()).await.unwrap().unwrap();
    assert_eq!(product.category_name, "Robux Premium");
}

#[tokio::test]
async fn test_catalog_validates_forms_and_restocks() {
    let h = start(5).await;
    let bad_price = h
        .system
        .catalog
        .add_product(
            &h.admin,
            ProductForm {
                name: "Skin".to_string(),
                price: "1,999".to_string(),
                stock: "1".to_string(),
                category_id: h.product.category_id.clone(),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_price, Err(StorefrontError::Validation(_))));

    let stock = h.system.catalog.add_stock(&h.admin, h.product.id.clone(), "7").await.unwrap();
    assert_eq!(stock, 12);
    assert_eq!(
        h.system.catalog.add_stock(&Member::new(5), h.product.id.clone(), "7").await,
        Err(StorefrontError::Unauthorized(Member::new(5).id))
    );
}

#[tokio::test]
async fn test_oversized_total_is_refused_and_registry_keeps_serving() {
    let h = start(10).await;
    let huge = "10000000000000000000000000000";
    let refused = h
        .system
        .catalog
        .add_product(
            &h.admin,
            ProductForm {
                name: "Whale pack".to_string(),
                price: huge.to_string(),
                stock: "10".to_string(),
                category_id: h.product.category_id.clone(),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(refused, Err(StorefrontError::Validation(_))));

    // A snapshot can still carry such a price past the form checks.
    let whale = Product {
        id: "product_whale".to_string(),
        price: rust_decimal::Decimal::from_str_exact(huge).unwrap(),
        stock: 10,
        ..h.product.clone()
    };
    h.system.products.restore(vec![whale.clone()]).await.unwrap();

    let buyer = Member::new(42);
    let result = h.system.checkout.finalize_purchase(buyer.clone(), whale.id.clone(), 10).await;
    assert!(matches!(result, Err(StorefrontError::Validation(_))));
    assert!(h.system.tickets.list_open().await.unwrap().is_empty());
    assert!(h.chat.live_channels().is_empty());

    let ticket = h.open_ticket(&buyer, 1).await;
    assert_eq!(ticket.status, TicketStatus::Open);
}

#[tokio::test]
async fn test_reports_summarize_sales() {
    let h = start(10).await;
    let sold = h.open_with_order(&Member::new(10), 3).await;
    h.open_with_order(&Member::new(11), 1).await;
    h.system.checkout.approve(h.admin.clone(), sold.code.clone()).await.unwrap();

    let report = h.system.reports.sales_report(&h.admin).await.unwrap();
    assert_eq!(report.summary.approved_count, 1);
    assert_eq!(report.summary.awaiting_count, 1);
    assert_eq!(report.summary.revenue, rust_decimal::Decimal::new(3000, 2));
    assert_eq!(report.top_sellers[0].quantity, 3);

    let info = h.system.reports.order_info(&h.admin, sold.code.to_lowercase()).await.unwrap();
    assert_eq!(info.order.map(|o| o.status), Some(OrderStatus::Approved));
    assert!(matches!(
        h.system.reports.order_info(&h.admin, "nope".to_string()).await,
        Err(StorefrontError::Validation(_))
    ));
    assert!(matches!(
        h.system.reports.order_info(&h.admin, "ZZZZZZ".to_string()).await,
        Err(StorefrontError::NotFound(_))
    ));
    assert_eq!(h.system.reports.open_tickets(&h.admin).await.unwrap().len(), 1);
    assert_eq!(h.system.reports.stock_overview(&h.admin).await.unwrap()[0].stock, 7);
    assert!(h.system.reports.recent_orders(&Member::new(10)).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_restart_recovers_pending_close() {
    let h = start(5).await;
    let ticket = h.open_with_order(&Member::new(42), 1).await;
    h.system.checkout.approve(h.admin.clone(), ticket.code.clone()).await.unwrap();

    let snapshot = h.system.snapshot().await.unwrap();
    h.system.shutdown().await.unwrap();

    let chat = Arc::new(InMemoryChat::new());
    let restarted = StorefrontSystem::start(&test_config(), chat);
    restarted.restore(snapshot).await.unwrap();
    assert_eq!(restarted.recover_pending_closes().await.unwrap(), 1);

    tokio::time::sleep(Duration::from_secs(61)).await;
    let ticket = restarted.tickets.get_ticket(ticket.code).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Closed);
    assert_eq!(restarted.products.list_products().await.unwrap()[0].stock, 4);
}

#[tokio::test]
async fn test_delete_category_request_sequence() {
    let (product_inner, mut product_rx) = create_mock_client::<Product>(10);
    let (category_inner, mut category_rx) = create_mock_client::<Category>(10);
    let catalog = CatalogClient::new(
        ProductClient::new(product_inner),
        CategoryClient::new(category_inner),
        Arc::new(RoleAdminPolicy::new(vec![ADMIN_ROLE])),
    );

    let task = tokio::spawn(async move {
        let admin = Member::new(1).with_role(ADMIN_ROLE);
        catalog.delete_category(&admin, "category_1".to_string()).await
    });

    let (id, responder) = expect_get(&mut category_rx).await.expect("Expected Category Get");
    assert_eq!(id, "category_1");
    responder
        .send(Ok(Some(Category {
            id: "category_1".to_string(),
            name: "Empty".to_string(),
            emoji: None,
            created_at: Utc::now(),
            updated_at: None,
        })))
        .unwrap();

    let responder = expect_list(&mut product_rx).await.expect("Expected Product List");
    responder.send(Ok(Vec::new())).unwrap();

    let (id, responder) = expect_delete(&mut category_rx).await.expect("Expected Category Delete");
    assert_eq!(id, "category_1");
    responder.send(Ok(())).unwrap();

    assert_eq!(task.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn test_category_rename_skips_products_deleted_meanwhile() {
    let (product_inner, mut product_rx) = create_mock_client::<Product>(10);
    let (category_inner, mut category_rx) = create_mock_client::<Category>(10);
    let catalog = CatalogClient::new(
        ProductClient::new(product_inner),
        CategoryClient::new(category_inner),
        Arc::new(RoleAdminPolicy::new(vec![ADMIN_ROLE])),
    );

    let task = tokio::spawn(async move {
        let admin = Member::new(1).with_role(ADMIN_ROLE);
        catalog
            .edit_category(&admin, "category_1".to_string(), "Premium".to_string(), None)
            .await
    });

    let saved = Category {
        id: "category_1".to_string(),
        name: "Premium".to_string(),
        emoji: None,
        created_at: Utc::now(),
        updated_at: Some(Utc::now()),
    };
    let (id, patch, responder) = expect_update(&mut category_rx).await.expect("Expected Category Update");
    assert_eq!(id, "category_1");
    assert_eq!(patch.name, "Premium");
    responder.send(Ok(saved.clone())).unwrap();

    let listed = |id: &str| Product {
        id: id.to_string(),
        name: "Robux 400".to_string(),
        price: rust_decimal::Decimal::new(1000, 2),
        stock: 3,
        description: None,
        image_url: None,
        category_id: "category_1".to_string(),
        category_name: "Robux".to_string(),
        created_at: Utc::now(),
        updated_at: None,
    };
    let responder = expect_list(&mut product_rx).await.expect("Expected Product List");
    responder.send(Ok(vec![listed("product_gone"), listed("product_kept")])).unwrap();

    let (id, _, responder) = expect_action(&mut product_rx).await.expect("Expected first rename");
    assert_eq!(id, "product_gone");
    responder.send(Err(ProductError::NotFound(id))).unwrap();

    let (id, action, responder) = expect_action(&mut product_rx).await.expect("Expected second rename");
    assert_eq!(id, "product_kept");
    assert!(matches!(
        action,
        ProductAction::RenameCategory { ref name, .. } if name == "Premium"
    ));
    responder.send(Ok(ProductActionResult::RenameCategory { renamed: true })).unwrap();

    assert_eq!(task.await.unwrap(), Ok(saved));
}
