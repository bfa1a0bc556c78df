use anyhow::{anyhow, Result};
use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::domain::codec::CategoricalTensor;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct DigitModelConfig {
    pub capacity:    usize,
    pub num_classes: usize,
    #[config(default = 128)]
    pub hidden_1:    usize,
    #[config(default = 256)]
    pub hidden_2:    usize,
    #[config(default = 128)]
    pub recurrent:   usize,
    #[config(default = 0.2)]
    pub dropout:     f64,
}

impl DigitModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DigitModel<B> {
        let expand_1   = LinearConfig::new(1, self.hidden_1).init(device);
        let expand_2   = LinearConfig::new(self.hidden_1, self.hidden_2).init(device);
        let expand_3   = LinearConfig::new(self.hidden_2, self.capacity * self.num_classes).init(device);
        let recurrent  = LstmConfig::new(self.num_classes, self.recurrent, true).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        let classifier = LinearConfig::new(self.recurrent, self.num_classes).init(device);
        DigitModel {
            expand_1, expand_2, expand_3, recurrent, dropout, classifier,
            capacity:    self.capacity,
            num_classes: self.num_classes,
        }
    }
}

/// scalar [batch, 1] → dense expansion → reshape to [batch, L, 10]
/// → LSTM over the L steps → dropout → shared 10-way classifier.
#[derive(Module, Debug)]
pub struct DigitModel<B: Backend> {
    pub expand_1:    Linear<B>,
    pub expand_2:    Linear<B>,
    pub expand_3:    Linear<B>,
    pub recurrent:   Lstm<B>,
    pub dropout:     Dropout,
    pub classifier:  Linear<B>,
    pub capacity:    usize,
    pub num_classes: usize,
}

pub struct DigitOutput<B: Backend> {
    pub loss:    Tensor<B, 1>,
    pub logits:  Tensor<B, 3>,
    pub targets: Tensor<B, 2, Int>,
}

impl<B: Backend> DigitOutput<B> {
    /// (positions whose arg-max matches the target, positions seen)
    pub fn correct_positions(&self) -> (usize, usize) {
        let [batch, seq_len, _] = self.logits.dims();
        let predicted = self.logits.clone().argmax(2).reshape([batch * seq_len]);
        let expected  = self.targets.clone().reshape([batch * seq_len]);
        let correct: i64 = predicted
            .equal(expected)
            .int().sum().into_scalar().elem::<i64>();
        (correct as usize, batch * seq_len)
    }
}

impl<B: Backend> DigitModel<B> {
    /// inputs: [batch, 1] → logits: [batch, L, num_classes]
    pub fn forward(&self, inputs: Tensor<B, 2>) -> Tensor<B, 3> {
        let [batch_size, _] = inputs.dims();

        let x = activation::relu(self.expand_1.forward(inputs));
        let x = activation::relu(self.expand_2.forward(x));
        let x = activation::relu(self.expand_3.forward(x));
        let x = x.reshape([batch_size, self.capacity, self.num_classes]);

        let (x, _state) = self.recurrent.forward(x, None); // [batch, L, recurrent]
        // Dropout is a no-op unless the backend tracks gradients
        let x = self.dropout.forward(x);
        self.classifier.forward(x)
    }

    /// Softmax over the class axis: every row sums to 1.
    pub fn forward_probabilities(&self, inputs: Tensor<B, 2>) -> Tensor<B, 3> {
        activation::softmax(self.forward(inputs), 2)
    }

    /// Categorical cross-entropy averaged over every position of every example.
    pub fn forward_loss(&self, inputs: Tensor<B, 2>, targets: Tensor<B, 2, Int>) -> DigitOutput<B> {
        let logits = self.forward(inputs);
        let [batch, seq_len, classes] = logits.dims();

        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(
            logits.clone().reshape([batch * seq_len, classes]),
            targets.clone().reshape([batch * seq_len]),
        );
        DigitOutput { loss, logits, targets }
    }
}

/// Pull a [batch, L, classes] probability tensor back to the host.
pub fn to_categorical<B: Backend>(probabilities: Tensor<B, 3>) -> Result<Vec<CategoricalTensor>> {
    let [batch, seq_len, classes] = probabilities.dims();
    let values: Vec<f32> = probabilities
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;

    Ok(values
        .chunks_exact((seq_len * classes).max(1))
        .take(batch)
        .map(CategoricalTensor::from_flat)
        .collect())
}
