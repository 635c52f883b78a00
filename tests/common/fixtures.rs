use super::Journal;
use vali_mediator::{
    async_trait, impl_fire_and_forget, impl_notification, impl_request, CancellationToken,
    FireAndForgetHandler, HandlerResult, Message, Next, NotificationHandler, PipelineBehavior,
    PostProcessor, PreProcessor, Request, RequestHandler, RequestPostProcessor,
};

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub sku: String,
    pub quantity: u32,
}
impl_request!(PlaceOrder => String);

#[derive(Debug, Clone)]
pub struct ArchiveOrders {
    pub older_than_days: u32,
}
impl_fire_and_forget!(ArchiveOrders);

#[derive(Debug, Clone)]
pub struct OrderPlaced {
    pub order_id: u64,
}
impl_notification!(OrderPlaced);

pub struct PlaceOrderHandler {
    pub journal: Journal,
    pub fail: bool,
}

#[async_trait]
impl RequestHandler<PlaceOrder> for PlaceOrderHandler {
    async fn handle(&self, request: &PlaceOrder, _: &CancellationToken) -> HandlerResult<String> {
        self.journal.push("handler");
        if self.fail {
            return Err("warehouse unavailable".into());
        }
        Ok(format!("{}x{}", request.quantity, request.sku))
    }
}

pub struct ArchiveHandler {
    pub journal: Journal,
}

#[async_trait]
impl FireAndForgetHandler<ArchiveOrders> for ArchiveHandler {
    async fn handle(&self, command: &ArchiveOrders, _: &CancellationToken) -> HandlerResult<()> {
        self.journal.push(format!("archive>{}", command.older_than_days));
        Ok(())
    }
}

pub struct Subscriber {
    pub name: &'static str,
    pub priority: i32,
    pub fail: bool,
    pub journal: Journal,
}

impl Subscriber {
    pub fn new(name: &'static str, priority: i32, journal: &Journal) -> Self {
        Self {
            name,
            priority,
            fail: false,
            journal: journal.clone(),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl NotificationHandler<OrderPlaced> for Subscriber {
    async fn handle(&self, _: &OrderPlaced, _: &CancellationToken) -> HandlerResult<()> {
        self.journal.push(self.name);
        if self.fail {
            return Err(format!("{} rejected the event", self.name).into());
        }
        Ok(())
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn handler_name(&self) -> &str {
        self.name
    }
}

/// Behavior recording `<name>.pre` and `<name>.post` around the chain
pub struct Recording {
    pub name: String,
    pub journal: Journal,
}

impl Recording {
    pub fn new(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl<M, T> PipelineBehavior<M, T> for Recording
where
    M: Message,
    T: Send + 'static,
{
    async fn handle(&self, _: &M, next: Next<'_, T>, _: &CancellationToken) -> HandlerResult<T> {
        self.journal.push(format!("{}.pre", self.name));
        let result = next.run().await;
        self.journal.push(format!("{}.post", self.name));
        result
    }
}

/// Pre/post processor recording `<label>.pre` or `<label>.post`
pub struct Audit {
    pub label: &'static str,
    pub journal: Journal,
}

impl Audit {
    pub fn new(label: &'static str, journal: &Journal) -> Self {
        Self {
            label,
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl<M: Message> PreProcessor<M> for Audit {
    async fn process(&self, _: &M, _: &CancellationToken) -> HandlerResult<()> {
        self.journal.push(format!("{}.pre", self.label));
        Ok(())
    }
}

#[async_trait]
impl<M: Message> PostProcessor<M> for Audit {
    async fn process(&self, _: &M, _: &CancellationToken) -> HandlerResult<()> {
        self.journal.push(format!("{}.post", self.label));
        Ok(())
    }
}

#[async_trait]
impl<R> RequestPostProcessor<R> for Audit
where
    R: Request,
    R::Response: std::fmt::Display,
{
    async fn process(
        &self,
        _: &R,
        response: &R::Response,
        _: &CancellationToken,
    ) -> HandlerResult<()> {
        self.journal.push(format!("{}.post={}", self.label, response));
        Ok(())
    }
}

/// Behavior that fails the dispatch, optionally after running the rest of the chain
pub struct Rejecting {
    pub name: &'static str,
    pub call_next: bool,
    pub journal: Journal,
}

impl Rejecting {
    pub fn after_next(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            call_next: true,
            journal: journal.clone(),
        }
    }

    pub fn before_next(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            call_next: false,
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl<M, T> PipelineBehavior<M, T> for Rejecting
where
    M: Message,
    T: Send + 'static,
{
    async fn handle(&self, _: &M, next: Next<'_, T>, _: &CancellationToken) -> HandlerResult<T> {
        self.journal.push(format!("{}.pre", self.name));
        if self.call_next {
            next.run().await?;
        }
        Err(format!("{} rejected the dispatch", self.name).into())
    }
}

/// Request behavior answering from a cache without calling the handler
pub struct Cached {
    pub response: &'static str,
}

#[async_trait]
impl PipelineBehavior<PlaceOrder, String> for Cached {
    async fn handle(
        &self,
        _: &PlaceOrder,
        _next: Next<'_, String>,
        _: &CancellationToken,
    ) -> HandlerResult<String> {
        Ok(self.response.to_string())
    }
}

/// Pre-processor that always fails
pub struct Gatekeeper {
    pub journal: Journal,
}

#[async_trait]
impl<M: Message> PreProcessor<M> for Gatekeeper {
    async fn process(&self, _: &M, _: &CancellationToken) -> HandlerResult<()> {
        self.journal.push("gatekeeper.pre");
        Err("quota exceeded".into())
    }
}
